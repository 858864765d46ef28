use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DecimalSeparator {
    Comma,
    Period,
}

/// Applies the separator policy to the weight text the device produced.
///
/// Only punctuation changes; digit content and count never do. Display and
/// injection both go through here so the two always agree.
pub fn format_weight(weight: &str, separator: DecimalSeparator) -> String {
    match separator {
        DecimalSeparator::Comma => weight.replace('.', ","),
        DecimalSeparator::Period => weight.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comma_replaces_every_period() {
        assert_eq!(format_weight("12.345", DecimalSeparator::Comma), "12,345");
        assert_eq!(format_weight("0.0", DecimalSeparator::Comma), "0,0");
    }

    #[test]
    fn period_leaves_text_unchanged() {
        assert_eq!(format_weight("12.345", DecimalSeparator::Period), "12.345");
        assert_eq!(format_weight("-3.20", DecimalSeparator::Period), "-3.20");
    }

    #[test]
    fn digits_survive_a_round_trip() {
        let digits = |s: &str| s.chars().filter(char::is_ascii_digit).collect::<String>();
        for original in ["12.345", "0.5", "1234", "7,5"] {
            let once = format_weight(original, DecimalSeparator::Comma);
            let twice = format_weight(&once, DecimalSeparator::Period);
            assert_eq!(digits(&twice), digits(original));
            assert_eq!(twice.len(), original.len());
        }
    }
}
