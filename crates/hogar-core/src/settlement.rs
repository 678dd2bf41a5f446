//! Proportional expense settlement between the two parties.
//!
//! Each party owes a share of the period's expenses proportional to their
//! income; the balance is what they paid minus that share. No rounding is
//! applied here.

use std::fmt;

use hogar_domain::{Amounted, Income, PaidBy, Party, PartySplit};

/// Sign of a balance: overpaid (or even) is in favor, underpaid is against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Standing {
    InFavor,
    Against,
}

impl Standing {
    pub fn of(balance: f64) -> Self {
        if balance >= 0.0 {
            Standing::InFavor
        } else {
            Standing::Against
        }
    }
}

impl fmt::Display for Standing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Standing::InFavor => "in favor",
            Standing::Against => "against",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settlement {
    pub income: Income,
    pub total_income: f64,
    /// Share fractions in `[0, 1]`, summing to one.
    pub fractions: PartySplit<f64>,
    pub total_expenses: f64,
    pub shares: PartySplit<f64>,
    pub paid: PartySplit<f64>,
    pub balances: PartySplit<f64>,
    /// True when the total income was zero and the split fell back to 50/50.
    pub even_split: bool,
}

impl Settlement {
    pub fn balance(&self, party: Party) -> f64 {
        *self.balances.get(party)
    }

    pub fn standing(&self, party: Party) -> Standing {
        Standing::of(self.balance(party))
    }

    /// Income shares as percentages.
    pub fn proportions(&self) -> PartySplit<f64> {
        self.fractions.map(|fraction| fraction * 100.0)
    }
}

/// Settles `expenses` against `income`.
pub fn settle<E>(income: &Income, expenses: &[E]) -> Settlement
where
    E: Amounted + PaidBy,
{
    let total_income = income.total();
    let fractions = income.fractions();

    let mut paid = PartySplit::new(0.0, 0.0);
    for expense in expenses {
        *paid.get_mut(expense.paid_by()) += expense.amount();
    }
    let total_expenses = paid.total();

    let shares = fractions.map(|fraction| total_expenses * fraction);
    let balances = PartySplit::new(
        paid.esposa - shares.esposa,
        paid.esposo - shares.esposo,
    );

    Settlement {
        income: *income,
        total_income,
        fractions,
        total_expenses,
        shares,
        paid,
        balances,
        even_split: total_income <= 0.0,
    }
}
