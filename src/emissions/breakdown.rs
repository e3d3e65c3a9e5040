//! Gas Breakdown
//!
//! Splits a total CO₂e figure into CO₂ / CH₄ / N₂O contributions for
//! interpretability. The split excludes any transport-emission component.

use serde::{Deserialize, Serialize};

use super::factors::{co2e, EmissionFactorTable, Gas};

/// Round half away from zero to two decimals. Values too large to scale
/// have no fractional part and come back unchanged.
pub fn round2(value: f64) -> f64 {
    let scaled = value * 100.0;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round() / 100.0
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GasShare {
    pub co2e_kg: f64,
    pub percentage: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GasBreakdown {
    pub co2: GasShare,
    pub ch4: GasShare,
    pub n2o: GasShare,
    pub total_co2e: f64,
}

/// Compute per-gas contributions (kg CO₂e) whose sum matches `total_co2e`.
///
/// 1. Gas masses from emission factors: `m = EF * quantity_kg`.
/// 2. Masses to CO₂e via GWP.
/// 3. `extra_treatment_co2e` (user-supplied, kg CO₂e) is added to the CO₂ share.
/// 4. Shares are scaled so they sum to the model's total.
pub fn calculate_gas_breakdown(
    table: &EmissionFactorTable,
    waste_type: &str,
    treatment_method: &str,
    quantity_tons: f64,
    total_co2e: f64,
    extra_treatment_co2e: f64,
) -> GasBreakdown {
    let factors = table.lookup(waste_type, treatment_method);
    let quantity_kg = quantity_tons * 1000.0;

    let mut raw = Gas::ALL.map(|gas| co2e(gas, factors.get(gas) * quantity_kg));

    let extra = if extra_treatment_co2e.is_finite() && extra_treatment_co2e > 0.0 {
        extra_treatment_co2e
    } else {
        0.0
    };
    raw[0] += extra;

    let raw_total: f64 = raw.iter().sum();
    let scale = if raw_total > 0.0 { total_co2e / raw_total } else { 1.0 };

    let shares = raw.map(|value| {
        let scaled = value * scale;
        let percentage = if total_co2e > 0.0 {
            scaled / total_co2e * 100.0
        } else {
            0.0
        };
        GasShare {
            co2e_kg: round2(scaled),
            percentage: round2(percentage),
        }
    });

    GasBreakdown {
        co2: shares[0],
        ch4: shares[1],
        n2o: shares[2],
        total_co2e: round2(total_co2e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 0.05
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(1.234), 1.23);
        assert_eq!(round2(1.235_1), 1.24);
        assert_eq!(round2(-2.5_f64 / 100.0), -0.03);
        assert_eq!(round2(0.0), 0.0);
    }

    #[test]
    fn test_round2_keeps_huge_values() {
        assert_eq!(round2(1e307), 1e307);
        assert_eq!(round2(-f64::MAX), -f64::MAX);
    }

    #[test]
    fn test_huge_total_stays_finite() {
        let table = EmissionFactorTable::builtin();
        let b = calculate_gas_breakdown(&table, "Sludge", "Physical", 1.0, 1e307, 0.0);
        assert_eq!(b.total_co2e, 1e307);
        for share in [b.co2, b.ch4, b.n2o] {
            assert!(share.co2e_kg.is_finite());
            assert!(share.percentage.is_finite());
        }
        assert!(close(b.co2.percentage + b.ch4.percentage + b.n2o.percentage, 100.0));
    }

    #[test]
    fn test_sludge_dewatering_shares() {
        let table = EmissionFactorTable::builtin();
        // 1 ton: CO2 30, CH4 30*28 = 840, N2O 18*298 = 5364 -> raw total 6234
        let b = calculate_gas_breakdown(&table, "Sludge", "Dewatering", 1.0, 6234.0, 0.0);

        assert_eq!(b.co2.co2e_kg, 30.0);
        assert_eq!(b.ch4.co2e_kg, 840.0);
        assert_eq!(b.n2o.co2e_kg, 5364.0);
        assert_eq!(b.total_co2e, 6234.0);
        assert!(close(b.co2.percentage + b.ch4.percentage + b.n2o.percentage, 100.0));
    }

    #[test]
    fn test_shares_scale_to_total() {
        let table = EmissionFactorTable::builtin();
        let b = calculate_gas_breakdown(&table, "Water Waste", "Biological", 12.5, 1000.0, 0.0);
        let sum = b.co2.co2e_kg + b.ch4.co2e_kg + b.n2o.co2e_kg;
        assert!(close(sum, 1000.0));
        assert_eq!(b.total_co2e, 1000.0);
    }

    #[test]
    fn test_extra_treatment_goes_to_co2() {
        let table = EmissionFactorTable::builtin();
        // Waste Oil / Chemical only emits CO2: 85 kg per ton
        let without = calculate_gas_breakdown(&table, "Waste Oil", "Chemical", 1.0, 100.0, 0.0);
        assert_eq!(without.co2.percentage, 100.0);

        let with = calculate_gas_breakdown(&table, "Sludge", "Physical", 1.0, 1000.0, 500.0);
        let plain = calculate_gas_breakdown(&table, "Sludge", "Physical", 1.0, 1000.0, 0.0);
        assert!(with.co2.percentage > plain.co2.percentage);
        assert!(with.ch4.percentage < plain.ch4.percentage);
    }

    #[test]
    fn test_negative_extra_is_ignored() {
        let table = EmissionFactorTable::builtin();
        let a = calculate_gas_breakdown(&table, "Sludge", "Chemical", 2.0, 400.0, -50.0);
        let b = calculate_gas_breakdown(&table, "Sludge", "Chemical", 2.0, 400.0, 0.0);
        assert_eq!(a, b);
    }

    #[test]
    fn test_zero_quantity_keeps_unscaled_zero_shares() {
        let table = EmissionFactorTable::builtin();
        let b = calculate_gas_breakdown(&table, "Sludge", "Physical", 0.0, 250.0, 0.0);
        assert_eq!(b.co2.co2e_kg, 0.0);
        assert_eq!(b.ch4.co2e_kg, 0.0);
        assert_eq!(b.n2o.co2e_kg, 0.0);
        assert_eq!(b.total_co2e, 250.0);
    }

    #[test]
    fn test_non_positive_total_zeroes_percentages() {
        let table = EmissionFactorTable::builtin();
        let b = calculate_gas_breakdown(&table, "Sludge", "Physical", 1.0, 0.0, 0.0);
        assert_eq!(b.co2.percentage, 0.0);
        assert_eq!(b.ch4.percentage, 0.0);
        assert_eq!(b.n2o.percentage, 0.0);
        assert_eq!(b.total_co2e, 0.0);
    }

    #[test]
    fn test_unknown_pair_uses_fallback_factors() {
        let table = EmissionFactorTable::builtin();
        // fallback: CO2 20, CH4 10*28 = 280, N2O 5*298 = 1490 -> 1790
        let b = calculate_gas_breakdown(&table, "Plastic", "Shredding", 1.0, 1790.0, 0.0);
        assert_eq!(b.co2.co2e_kg, 20.0);
        assert_eq!(b.ch4.co2e_kg, 280.0);
        assert_eq!(b.n2o.co2e_kg, 1490.0);
    }
}
