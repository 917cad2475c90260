//! Variable types of the source language

use serde::{Deserialize, Serialize};
use std::fmt;

/// Declared type of a variable: a scalar or a multi-dimensional array
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VarType {
    Scalar,
    Array(Vec<i32>),
}

impl VarType {
    pub fn is_array(&self) -> bool {
        matches!(self, VarType::Array(_))
    }

    pub fn dims(&self) -> &[i32] {
        match self {
            VarType::Scalar => &[],
            VarType::Array(dims) => dims,
        }
    }

    /// Size in bytes; every element takes 4 bytes
    pub fn size(&self) -> i32 {
        match self {
            VarType::Scalar => 4,
            VarType::Array(dims) => 4 * dims.iter().product::<i32>(),
        }
    }
}

impl fmt::Display for VarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VarType::Scalar => write!(f, "var"),
            VarType::Array(dims) => {
                write!(f, "array")?;
                for dim in dims {
                    write!(f, "[{}]", dim)?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_size_is_four_times_product() {
        assert_eq!(VarType::Scalar.size(), 4);
        assert_eq!(VarType::Array(vec![3, 4]).size(), 48);
        assert_eq!(VarType::Array(vec![10]).size(), 40);
    }

    #[test]
    fn display_forms() {
        assert_eq!(VarType::Scalar.to_string(), "var");
        assert_eq!(VarType::Array(vec![3, 4]).to_string(), "array[3][4]");
    }
}
