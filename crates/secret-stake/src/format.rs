// Copyright 2025 RISC Zero, Inc.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::rewards::TOKEN_DECIMALS;

/// Placeholder shown in place of a value that has not been decrypted.
pub const MASKED: &str = "***";

/// Format a base-unit amount of a 6-decimal token, e.g. `10,000.000000`.
pub fn format_token_amount(amount: u64) -> String {
    let scale = 10u64.pow(TOKEN_DECIMALS as u32);
    format!(
        "{}.{:0width$}",
        format_with_commas(amount / scale),
        amount % scale,
        width = TOKEN_DECIMALS as usize
    )
}

/// Format a u64 number with comma separators
pub fn format_with_commas(num: u64) -> String {
    let digits = num.to_string();
    let mut result = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_token_amount() {
        assert_eq!(format_token_amount(0), "0.000000");
        assert_eq!(format_token_amount(1), "0.000001");
        assert_eq!(format_token_amount(500_000), "0.500000");
        assert_eq!(format_token_amount(1_000_000), "1.000000");
        assert_eq!(format_token_amount(10_000_000_000), "10,000.000000");
        assert_eq!(format_token_amount(1_234_567_890_123), "1,234,567.890123");
    }

    #[test]
    fn test_format_with_commas() {
        assert_eq!(format_with_commas(0), "0");
        assert_eq!(format_with_commas(100), "100");
        assert_eq!(format_with_commas(1000), "1,000");
        assert_eq!(format_with_commas(100000), "100,000");
        assert_eq!(format_with_commas(1234567890), "1,234,567,890");
        assert_eq!(format_with_commas(u64::MAX), "18,446,744,073,709,551,615");
    }
}
