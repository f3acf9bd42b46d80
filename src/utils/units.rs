/// Standard linear conversion, degrees Celsius to Fahrenheit
pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

/// Standard linear conversion, degrees Fahrenheit to Celsius
pub fn fahrenheit_to_celsius(fahrenheit: f64) -> f64 {
    (fahrenheit - 32.0) * 5.0 / 9.0
}

/// Format a temperature for the acquisition CSV: whole values render as
/// integers, everything else with one decimal place
pub fn format_temperature(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{:.1}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_celsius_to_fahrenheit() {
        assert_eq!(celsius_to_fahrenheit(0.0), 32.0);
        assert_eq!(celsius_to_fahrenheit(100.0), 212.0);
        assert_eq!(celsius_to_fahrenheit(32.0), 89.6);
    }

    #[test]
    fn test_fahrenheit_to_celsius() {
        assert_eq!(fahrenheit_to_celsius(32.0), 0.0);
        assert_eq!(fahrenheit_to_celsius(212.0), 100.0);
    }

    #[test]
    fn test_conversion_round_trip() {
        for celsius in [-40.0, -9.9, 0.0, 24.0, 32.0, 35.0, 41.3] {
            let round_trip = fahrenheit_to_celsius(celsius_to_fahrenheit(celsius));
            assert!(
                (round_trip - celsius).abs() < 1e-9,
                "round trip drifted for {}: {}",
                celsius,
                round_trip
            );
        }
    }

    #[test]
    fn test_format_whole_values_as_integers() {
        assert_eq!(format_temperature(91.0), "91");
        assert_eq!(format_temperature(-5.0), "-5");
        assert_eq!(format_temperature(0.0), "0");
    }

    #[test]
    fn test_format_fractional_values_one_decimal() {
        assert_eq!(format_temperature(91.4), "91.4");
        assert_eq!(format_temperature(78.25), "78.2");
        assert_eq!(format_temperature(-2.55), "-2.5");
    }
}
