//! ABI type parsing and coercion of JSON leaf values.
//!
//! Standard-tree values arrive as JSON rows next to an array of Solidity type
//! strings. The row is coerced field by field into [`DynSolValue`]s and
//! encoded with `abi.encode` semantics (head/tail tuple encoding, no outer
//! offset). Every shape or range mismatch is reported as an
//! `InvalidArgument` at the boundary.

use alloy_dyn_abi::{DynSolType, DynSolValue};
use alloy_primitives::{Address, B256, I256, U256};
use serde_json::Value;

use crate::bytes::decode_hex;
use crate::error::{MerkleError, MerkleResult};

/// Parses an array of Solidity type strings into their runtime descriptors.
pub fn parse_encoding<S: AsRef<str>>(leaf_encoding: &[S]) -> MerkleResult<Vec<DynSolType>> {
    leaf_encoding
        .iter()
        .map(|ty| {
            DynSolType::parse(ty.as_ref()).map_err(|err| {
                MerkleError::invalid_argument(format!("Invalid ABI type '{}': {}", ty.as_ref(), err))
            })
        })
        .collect()
}

/// ABI-encodes one leaf row against its encoding, as `abi.encode(...)` would.
pub fn encode_leaf(encoding: &[DynSolType], value: &[Value]) -> MerkleResult<Vec<u8>> {
    if encoding.len() != value.len() {
        return Err(MerkleError::invalid_argument(format!(
            "Expected {} leaf fields, got {}",
            encoding.len(),
            value.len()
        )));
    }
    let fields = encoding
        .iter()
        .zip(value)
        .map(|(ty, item)| coerce(ty, item))
        .collect::<MerkleResult<Vec<_>>>()?;
    Ok(DynSolValue::Tuple(fields).abi_encode_params())
}

fn coerce(ty: &DynSolType, value: &Value) -> MerkleResult<DynSolValue> {
    match ty {
        DynSolType::Address => {
            let text = expect_str(value, "an address string")?;
            let address = text.parse::<Address>().map_err(|err| {
                MerkleError::invalid_argument(format!("Invalid address '{}': {}", text, err))
            })?;
            Ok(DynSolValue::Address(address))
        }
        DynSolType::Bool => match value {
            Value::Bool(flag) => Ok(DynSolValue::Bool(*flag)),
            Value::String(text) if text == "true" => Ok(DynSolValue::Bool(true)),
            Value::String(text) if text == "false" => Ok(DynSolValue::Bool(false)),
            other => Err(coercion_error(ty, other)),
        },
        DynSolType::Uint(bits) => {
            let magnitude = uint_from(value)?;
            if *bits < 256 && magnitude >> *bits != U256::ZERO {
                return Err(MerkleError::invalid_argument(format!(
                    "Value does not fit in uint{}",
                    bits
                )));
            }
            Ok(DynSolValue::Uint(magnitude, *bits))
        }
        DynSolType::Int(bits) => {
            let signed = int_from(value)?;
            if *bits < 256 {
                let half = I256::from_raw(U256::from(1u8) << (bits - 1));
                if signed >= half || signed < -half {
                    return Err(MerkleError::invalid_argument(format!(
                        "Value does not fit in int{}",
                        bits
                    )));
                }
            }
            Ok(DynSolValue::Int(signed, *bits))
        }
        DynSolType::FixedBytes(size) => {
            let text = expect_str(value, "a hex string")?;
            let data = decode_hex(text)?;
            if data.len() != *size {
                return Err(MerkleError::invalid_argument(format!(
                    "Expected {} bytes for bytes{}, got {}",
                    size,
                    size,
                    data.len()
                )));
            }
            let mut word = B256::ZERO;
            word.0[..data.len()].copy_from_slice(&data);
            Ok(DynSolValue::FixedBytes(word, *size))
        }
        DynSolType::Bytes => {
            let text = expect_str(value, "a hex string")?;
            Ok(DynSolValue::Bytes(decode_hex(text)?))
        }
        DynSolType::String => {
            let text = expect_str(value, "a string")?;
            Ok(DynSolValue::String(text.to_owned()))
        }
        DynSolType::Array(inner) => {
            let items = expect_array(value)?;
            let coerced = items
                .iter()
                .map(|item| coerce(inner, item))
                .collect::<MerkleResult<Vec<_>>>()?;
            Ok(DynSolValue::Array(coerced))
        }
        DynSolType::FixedArray(inner, len) => {
            let items = expect_array(value)?;
            if items.len() != *len {
                return Err(MerkleError::invalid_argument(format!(
                    "Expected {} array elements, got {}",
                    len,
                    items.len()
                )));
            }
            let coerced = items
                .iter()
                .map(|item| coerce(inner, item))
                .collect::<MerkleResult<Vec<_>>>()?;
            Ok(DynSolValue::FixedArray(coerced))
        }
        DynSolType::Tuple(inner) => {
            let items = expect_array(value)?;
            if items.len() != inner.len() {
                return Err(MerkleError::invalid_argument(format!(
                    "Expected {} tuple fields, got {}",
                    inner.len(),
                    items.len()
                )));
            }
            let coerced = inner
                .iter()
                .zip(items)
                .map(|(field_ty, item)| coerce(field_ty, item))
                .collect::<MerkleResult<Vec<_>>>()?;
            Ok(DynSolValue::Tuple(coerced))
        }
        other => Err(MerkleError::invalid_argument(format!(
            "Unsupported ABI type '{}'",
            other.sol_type_name()
        ))),
    }
}

fn uint_from(value: &Value) -> MerkleResult<U256> {
    match value {
        Value::Number(number) => number
            .as_u64()
            .map(U256::from)
            .ok_or_else(|| coercion_failure("an unsigned integer", value)),
        Value::String(text) => parse_uint_str(text),
        other => Err(coercion_failure("an unsigned integer", other)),
    }
}

fn parse_uint_str(text: &str) -> MerkleResult<U256> {
    let parsed = match text.strip_prefix("0x") {
        Some(digits) => U256::from_str_radix(digits, 16),
        None => U256::from_str_radix(text, 10),
    };
    parsed.map_err(|err| {
        MerkleError::invalid_argument(format!("Invalid integer '{}': {}", text, err))
    })
}

fn int_from(value: &Value) -> MerkleResult<I256> {
    match value {
        Value::Number(number) => {
            let raw = number
                .as_i64()
                .ok_or_else(|| coercion_failure("a signed integer", value))?;
            int_from_magnitude(raw < 0, U256::from(raw.unsigned_abs()))
        }
        Value::String(text) => {
            let (negative, digits) = match text.strip_prefix('-') {
                Some(rest) => (true, rest),
                None => (false, text.strip_prefix('+').unwrap_or(text)),
            };
            int_from_magnitude(negative, parse_uint_str(digits)?)
        }
        other => Err(coercion_failure("a signed integer", other)),
    }
}

fn int_from_magnitude(negative: bool, magnitude: U256) -> MerkleResult<I256> {
    let min_magnitude = U256::from(1u8) << 255;
    if negative {
        if magnitude > min_magnitude {
            return Err(MerkleError::invalid_argument(
                "Value does not fit in int256",
            ));
        }
        if magnitude == min_magnitude {
            return Ok(I256::MIN);
        }
        Ok(-I256::from_raw(magnitude))
    } else {
        if magnitude >= min_magnitude {
            return Err(MerkleError::invalid_argument(
                "Value does not fit in int256",
            ));
        }
        Ok(I256::from_raw(magnitude))
    }
}

fn expect_str<'a>(value: &'a Value, wanted: &str) -> MerkleResult<&'a str> {
    value
        .as_str()
        .ok_or_else(|| coercion_failure(wanted, value))
}

fn expect_array(value: &Value) -> MerkleResult<&Vec<Value>> {
    value
        .as_array()
        .ok_or_else(|| coercion_failure("an array", value))
}

fn coercion_error(ty: &DynSolType, value: &Value) -> MerkleError {
    MerkleError::invalid_argument(format!(
        "Cannot coerce {} into '{}'",
        value,
        ty.sol_type_name()
    ))
}

fn coercion_failure(wanted: &str, value: &Value) -> MerkleError {
    MerkleError::invalid_argument(format!("Expected {}, got {}", wanted, value))
}
