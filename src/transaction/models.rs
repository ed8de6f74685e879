//! The tag types that classify a transaction: its kind (income or expense),
//! its source of funds and the optional bank or e-wallet behind a debit.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::Error;

/// The ID of a transaction.
pub type TransactionId = i64;

/// Whether a transaction is income or an expense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub enum TransactionKind {
    /// Money coming in (pemasukan).
    Income,
    /// Money going out (pengeluaran).
    Expense,
}

impl TransactionKind {
    /// The string stored in the database for this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionKind::Income => "pemasukan",
            TransactionKind::Expense => "pengeluaran",
        }
    }

    /// The label shown in the UI for this kind.
    pub fn label(self) -> &'static str {
        match self {
            TransactionKind::Income => "Pemasukan",
            TransactionKind::Expense => "Pengeluaran",
        }
    }

    /// The sign to apply to this kind's amounts when computing a balance.
    pub fn sign(self) -> f64 {
        match self {
            TransactionKind::Income => 1.0,
            TransactionKind::Expense => -1.0,
        }
    }
}

impl FromStr for TransactionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pemasukan" => Ok(TransactionKind::Income),
            "pengeluaran" => Ok(TransactionKind::Expense),
            other => Err(Error::InvalidCategoryKind(other.to_owned())),
        }
    }
}

impl Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where the money for a transaction came from or went to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub enum FundSource {
    /// Physical cash.
    Cash,
    /// A bank account or e-wallet balance.
    Debit,
}

impl FundSource {
    /// The string stored in the database for this source.
    pub fn as_str(self) -> &'static str {
        match self {
            FundSource::Cash => "Cash",
            FundSource::Debit => "Debit",
        }
    }
}

impl FromStr for FundSource {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Cash" => Ok(FundSource::Cash),
            "Debit" => Ok(FundSource::Debit),
            other => Err(Error::InvalidSource(other.to_owned())),
        }
    }
}

impl Display for FundSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The bank or e-wallet holding a debit balance.
///
/// This is a closed set: the app tracks the three accounts the household
/// actually uses, so per-bank balances can be derived without a separate
/// account entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub enum Bank {
    /// The DANA e-wallet.
    Dana,
    /// Bank BTN.
    Btn,
    /// Seabank.
    Seabank,
}

/// Every known bank, in display order.
pub const ALL_BANKS: [Bank; 3] = [Bank::Dana, Bank::Btn, Bank::Seabank];

impl Bank {
    /// The string stored in the database for this bank.
    pub fn as_str(self) -> &'static str {
        match self {
            Bank::Dana => "DANA",
            Bank::Btn => "BTN",
            Bank::Seabank => "Seabank",
        }
    }
}

impl FromStr for Bank {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DANA" => Ok(Bank::Dana),
            "BTN" => Ok(Bank::Btn),
            "Seabank" => Ok(Bank::Seabank),
            other => Err(Error::InvalidBank(other.to_owned())),
        }
    }
}

impl Display for Bank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tag_parsing_tests {
    use crate::Error;

    use super::{Bank, FundSource, TransactionKind};

    #[test]
    fn kind_round_trips_through_database_strings() {
        for kind in [TransactionKind::Income, TransactionKind::Expense] {
            assert_eq!(kind.as_str().parse::<TransactionKind>(), Ok(kind));
        }
    }

    #[test]
    fn source_rejects_unknown_strings() {
        assert_eq!(
            "Kredit".parse::<FundSource>(),
            Err(Error::InvalidSource("Kredit".to_owned()))
        );
    }

    #[test]
    fn bank_round_trips_through_database_strings() {
        for bank in [Bank::Dana, Bank::Btn, Bank::Seabank] {
            assert_eq!(bank.as_str().parse::<Bank>(), Ok(bank));
        }
    }
}
