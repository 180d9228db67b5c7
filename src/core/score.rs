use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Grade {
    A1,
    A,
    B,
    C,
    D,
}

impl Grade {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::A1 => "A1",
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn grade_for_total(total: f64) -> Grade {
    if total >= 101.0 {
        Grade::A1
    } else if total >= 91.0 {
        Grade::A
    } else if total >= 76.0 {
        Grade::B
    } else if total >= 66.0 {
        Grade::C
    } else {
        Grade::D
    }
}
