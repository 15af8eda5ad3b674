//! Golden tests for BMI derivation and weight categories.
//!
//! These tests verify the derived values against known cases, including the
//! gap between the "Normal weight" and "Overweight" bands.

use patient_records_core::models::{Gender, PatientFields, WeightCategory};
use proptest::prelude::*;

/// Test case from golden table.
struct GoldenCase {
    id: &'static str,
    height: f64,
    weight: f64,
    expected_bmi: f64,
    expected_category: WeightCategory,
}

fn get_golden_cases() -> Vec<GoldenCase> {
    vec![
        GoldenCase {
            id: "asha-normal",
            height: 1.6,
            weight: 50.0,
            expected_bmi: 19.53,
            expected_category: WeightCategory::NormalWeight,
        },
        GoldenCase {
            id: "underweight",
            height: 1.8,
            weight: 55.0,
            expected_bmi: 16.98,
            expected_category: WeightCategory::Underweight,
        },
        GoldenCase {
            id: "lower-normal-edge",
            height: 1.0,
            weight: 18.5,
            expected_bmi: 18.5,
            expected_category: WeightCategory::NormalWeight,
        },
        GoldenCase {
            id: "gap-lower-edge",
            height: 1.0,
            weight: 24.9,
            expected_bmi: 24.9,
            expected_category: WeightCategory::Obesity,
        },
        GoldenCase {
            id: "gap-middle",
            height: 2.0,
            weight: 99.8,
            expected_bmi: 24.95,
            expected_category: WeightCategory::Obesity,
        },
        GoldenCase {
            id: "overweight-edge",
            height: 1.0,
            weight: 25.0,
            expected_bmi: 25.0,
            expected_category: WeightCategory::Overweight,
        },
        GoldenCase {
            id: "overweight",
            height: 1.75,
            weight: 85.0,
            expected_bmi: 27.76,
            expected_category: WeightCategory::Overweight,
        },
        GoldenCase {
            id: "just-above-tie",
            height: 2.0,
            weight: 118.9,
            expected_bmi: 29.73,
            expected_category: WeightCategory::Overweight,
        },
        GoldenCase {
            id: "just-below-tie",
            height: 2.0,
            weight: 66.3,
            expected_bmi: 16.57,
            expected_category: WeightCategory::Underweight,
        },
        GoldenCase {
            id: "obesity",
            height: 1.65,
            weight: 90.0,
            expected_bmi: 33.06,
            expected_category: WeightCategory::Obesity,
        },
    ]
}

fn fields(height: f64, weight: f64) -> PatientFields {
    PatientFields {
        name: "Golden".into(),
        city: "Bengaluru".into(),
        age: 45,
        gender: Gender::Other,
        height,
        weight,
    }
}

#[test]
fn test_golden_cases() {
    for case in get_golden_cases() {
        let f = fields(case.height, case.weight);
        assert_eq!(f.bmi(), case.expected_bmi, "bmi mismatch for {}", case.id);
        assert_eq!(
            f.category(),
            case.expected_category,
            "category mismatch for {}",
            case.id
        );
    }
}

#[test]
fn test_category_labels() {
    assert_eq!(WeightCategory::Underweight.to_string(), "Underweight");
    assert_eq!(WeightCategory::NormalWeight.to_string(), "Normal weight");
    assert_eq!(WeightCategory::Overweight.to_string(), "Overweight");
    assert_eq!(WeightCategory::Obesity.to_string(), "Obesity");
}

proptest! {
    #[test]
    fn prop_bmi_is_nearest_hundredth(height in 0.5f64..2.5, weight in 1.0f64..300.0) {
        let f = fields(height, weight);
        let raw = weight / (height * height);
        let bmi = f.bmi();
        let hundredths = bmi * 100.0;
        prop_assert!((hundredths - hundredths.round()).abs() < 1e-6);
        prop_assert!((bmi - raw).abs() <= 0.005 + 1e-9, "raw {} rounded to {}", raw, bmi);
        prop_assert!(f.validate().is_ok());
    }

    #[test]
    fn prop_category_follows_bands(bmi in 0.0f64..80.0) {
        let expected = if bmi < 18.5 {
            WeightCategory::Underweight
        } else if (18.5..24.9).contains(&bmi) {
            WeightCategory::NormalWeight
        } else if (25.0..29.9).contains(&bmi) {
            WeightCategory::Overweight
        } else {
            WeightCategory::Obesity
        };
        prop_assert_eq!(WeightCategory::from_bmi(bmi), expected);
    }

    #[test]
    fn prop_age_bounds(age in -500i64..500) {
        let mut f = fields(1.7, 65.0);
        f.age = age;
        prop_assert_eq!(f.validate().is_ok(), age > 0 && age < 120);
    }
}
