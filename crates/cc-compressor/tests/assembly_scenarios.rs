//! Assembly scenarios on the example CO2/R134a test gas.

use cc_compressor::{
    BackToBack, BackToBackTest, BearingOil, CasingHeat, CompressorError, CorrectionConfig, IsoVg,
    OilProperties, OilStream, Point1Sec, PointFirstSection, PointSecondSection, SealGas,
    StraightThrough, convert_test_point,
};
use cc_core::constants::T_ZERO_C;
use cc_core::units::{bar, k, kgps, m2, m3ps, mm, rpm};
use cc_fluids::{Composition, FluidModel, PengRobinsonModel, StateInput, ThermoState};
use cc_point::{
    Flow, Geometry, PerfContext, Point, PointInput, PolytropicMethod, ReynoldsCorrection,
};

fn test_gas() -> Composition {
    Composition::from_names(&[
        ("CO2", 0.80218),
        ("R134a", 0.18842),
        ("N2", 0.0091),
        ("O2", 0.0003),
    ])
    .unwrap()
}

fn state(model: &PengRobinsonModel, p_bar: f64, t: f64) -> ThermoState {
    model
        .state(
            StateInput::PT {
                p: bar(p_bar),
                t: k(t),
            },
            test_gas(),
        )
        .unwrap()
}

fn geometry() -> Geometry {
    Geometry::new(mm(28.5), mm(365.0))
}

fn point(
    ctx: &PerfContext<'_>,
    model: &PengRobinsonModel,
    disch: (f64, f64),
    flow: f64,
) -> Point {
    Point::new(
        ctx,
        PointInput::DischSuc {
            suc: state(model, 1.826, 296.7),
            disch: state(model, disch.0, disch.1),
        },
        Flow::Mass(kgps(flow)),
        rpm(7894.0),
        geometry(),
    )
    .unwrap()
}

fn example(ctx: &PerfContext<'_>, model: &PengRobinsonModel) -> Point {
    point(ctx, model, (6.142, 392.1), 7.737)
}

#[test]
fn disabled_leakage_keeps_flange_and_rotor_equal() {
    let model = PengRobinsonModel::new();
    let ctx = PerfContext::new(&model, PolytropicMethod::Schultz);
    let flange = example(&ctx, &model);
    let test = Point1Sec {
        balance_line_flow: Some(kgps(0.1076)),
        seal_gas: Some(SealGas {
            flow: kgps(0.04982),
            t: k(297.7),
        }),
        ..Point1Sec::new(flange.clone())
    };

    let assembly = StraightThrough::new(
        &ctx,
        flange.clone(),
        vec![test],
        CorrectionConfig::default(),
        None,
    )
    .unwrap();
    let converted = &assembly.points()[0];
    assert!((converted.rotor_test.eff() - flange.eff()).abs() < 1e-12);
    assert!((converted.rotor_test.flow_m().value - 7.737).abs() < 1e-12);
    assert!((converted.flange_sp.eff() - converted.rotor_sp.eff()).abs() < 1e-9);

    let g = assembly.point_guarantee();
    assert!((g.disch().p().value / flange.disch().p().value - 1.0).abs() < 1e-4);
    assert!((g.eff() - flange.eff()).abs() < 1e-6);
    assert!(assembly.curve().is_none());
}

fn leakage_test(flange: &Point) -> Point1Sec {
    Point1Sec {
        balance_line_flow: Some(kgps(0.1076)),
        seal_gas: Some(SealGas {
            flow: kgps(0.04982),
            t: k(297.7),
        }),
        ..Point1Sec::new(flange.clone())
    }
}

#[test]
fn leakage_balance_shifts_rotor_point() {
    let model = PengRobinsonModel::new();
    let ctx = PerfContext::new(&model, PolytropicMethod::Schultz);
    let flange = example(&ctx, &model);
    let config = CorrectionConfig {
        leakages: true,
        ..CorrectionConfig::default()
    };

    let without = StraightThrough::new(
        &ctx,
        flange.clone(),
        vec![leakage_test(&flange)],
        CorrectionConfig::default(),
        None,
    )
    .unwrap();
    let with =
        StraightThrough::new(&ctx, flange.clone(), vec![leakage_test(&flange)], config, None)
            .unwrap();
    let converted = &with.points()[0];
    let rotor = &converted.rotor_test;

    let expected_flow = 7.737 + 0.1076 + 0.95 * 0.04982 / 2.0;
    assert!((rotor.flow_m().value - expected_flow).abs() < 1e-9);
    // Seal gas throttled from discharge pressure cools the rotor suction.
    assert!(rotor.suc().t() < flange.suc().t());

    let shift = rotor.eff() - without.points()[0].rotor_test.eff();
    assert!((shift + 1.5e-4).abs() < 5e-5, "{shift}");

    // Converted back at the test conditions, the flange point is recovered.
    assert!((converted.flange_sp.flow_m().value / 7.737 - 1.0).abs() < 1e-4);
    assert!((converted.flange_sp.eff() - flange.eff()).abs() < 1e-4);
    assert!((converted.ratios.disch_p - 1.0).abs() < 1e-4);

    let single =
        convert_test_point(&ctx, &config, &leakage_test(&flange), &flange, with.speed()).unwrap();
    assert!((single.flange_sp.eff() - converted.flange_sp.eff()).abs() < 1e-12);
}

#[test]
fn speed_match_reproduces_guarantee_pressure() {
    let model = PengRobinsonModel::new();
    let ctx = PerfContext::new(&model, PolytropicMethod::Schultz);
    let flange = example(&ctx, &model);
    let guarantee = Point::new(
        &ctx,
        PointInput::EffDischPressureSuc {
            suc: flange.suc().clone(),
            eff: flange.eff(),
            disch_p: bar(6.4),
        },
        Flow::Mass(kgps(7.737)),
        rpm(7894.0),
        geometry(),
    )
    .unwrap();

    let assembly = StraightThrough::new(
        &ctx,
        guarantee,
        vec![Point1Sec::new(flange)],
        CorrectionConfig::default(),
        None,
    )
    .unwrap();
    let matched = assembly
        .calculate_speed_to_match_discharge_pressure(&ctx)
        .unwrap();

    let p_d = matched.point_guarantee().disch().p().value;
    assert!((p_d / 6.4e5 - 1.0).abs() < 1e-6, "{p_d}");
    assert!(matched.speed() > assembly.speed());
    assert!((assembly.point_guarantee().disch().p().value / 6.142e5 - 1.0).abs() < 1e-4);
}

#[test]
fn casing_heat_loss_is_added_back_and_removed_again() {
    let model = PengRobinsonModel::new();
    let ctx = PerfContext::new(&model, PolytropicMethod::Schultz);
    let flange = example(&ctx, &model);
    let test = Point1Sec {
        casing: Some(CasingHeat {
            area: m2(12.0),
            t_casing: k(360.0),
            t_ambient: k(298.0),
        }),
        ..Point1Sec::new(flange.clone())
    };
    let config = CorrectionConfig {
        casing_heat_loss: true,
        ..CorrectionConfig::default()
    };

    let assembly = StraightThrough::new(&ctx, flange.clone(), vec![test], config, None).unwrap();
    let converted = &assembly.points()[0];
    // Heat lost through the casing was done as work on the rotor.
    assert!(converted.rotor_test.disch().t() > flange.disch().t());
    assert!(converted.rotor_test.eff() < flange.eff());

    assert!((converted.ratios.disch_p - 1.0).abs() < 1e-4, "{}", converted.ratios.disch_p);
    let t_d = converted.flange_sp.disch().t().value;
    assert!((t_d - 392.1).abs() < 0.05, "{t_d}");
    assert!((converted.flange_sp.eff() - flange.eff()).abs() < 1e-4);

    let missing = StraightThrough::new(
        &ctx,
        flange.clone(),
        vec![Point1Sec::new(flange)],
        config,
        None,
    )
    .unwrap_err();
    assert!(matches!(missing, CompressorError::MissingAuxiliaryData { .. }));
}

#[test]
fn reynolds_correction_applies_through_the_assembly() {
    let model = PengRobinsonModel::new();
    let ctx = PerfContext::new(&model, PolytropicMethod::Schultz);
    let flange = example(&ctx, &model);
    let denser = Point::new(
        &ctx,
        PointInput::EffDischPressureSuc {
            suc: state(&model, 3.0, 296.7),
            eff: flange.eff(),
            disch_p: bar(9.5),
        },
        Flow::Mass(kgps(12.7)),
        rpm(7894.0),
        geometry(),
    )
    .unwrap();
    let corrected = CorrectionConfig {
        reynolds: ReynoldsCorrection::Ptc1997,
        ..CorrectionConfig::default()
    };

    let convert = |guarantee: &Point, config: CorrectionConfig| {
        StraightThrough::new(
            &ctx,
            guarantee.clone(),
            vec![Point1Sec::new(flange.clone())],
            config,
            None,
        )
        .unwrap()
        .points()[0]
            .clone()
    };

    // Same suction: same Reynolds number, nothing to correct.
    let own = convert(&flange, corrected);
    assert!((own.flange_sp.eff() - flange.eff()).abs() < 1e-6);

    let plain = convert(&denser, CorrectionConfig::default());
    let ptc = convert(&denser, corrected);
    assert!((plain.rotor_sp.eff() - flange.eff()).abs() < 1e-9);
    assert!(ptc.rotor_sp.reynolds() > ptc.rotor_test.reynolds());
    assert!(ptc.rotor_sp.eff() > plain.rotor_sp.eff());
    assert!(ptc.rotor_sp.eff() - plain.rotor_sp.eff() < 0.02);
}

#[test]
fn several_test_points_form_a_curve() {
    let model = PengRobinsonModel::new();
    let ctx = PerfContext::new(&model, PolytropicMethod::Schultz);
    let guarantee = example(&ctx, &model);
    let tests = vec![
        Point1Sec::new(point(&ctx, &model, (6.4, 398.0), 6.8)),
        Point1Sec::new(guarantee.clone()),
        Point1Sec::new(point(&ctx, &model, (5.7, 388.0), 8.5)),
    ];

    let assembly =
        StraightThrough::new(&ctx, guarantee.clone(), tests, CorrectionConfig::default(), None)
            .unwrap();
    let curve = assembly.curve().unwrap();
    assert_eq!(curve.points().len(), 3);
    let g = assembly.point_guarantee();
    assert!((g.flow_v().value / guarantee.flow_v().value - 1.0).abs() < 1e-9);
    assert!((g.disch().p().value / guarantee.disch().p().value - 1.0).abs() < 1e-3);
    assert!((assembly.ratios().head - 1.0).abs() < 1e-3);
    for p in assembly.points() {
        assert!(p.equivalent_speed.is_some());
    }
}

#[test]
fn enabled_bearing_losses_need_oil_data() {
    let model = PengRobinsonModel::new();
    let ctx = PerfContext::new(&model, PolytropicMethod::Schultz);
    let flange = example(&ctx, &model);
    let config = CorrectionConfig {
        bearing_mechanical_losses: true,
        ..CorrectionConfig::default()
    };

    let err = StraightThrough::new(
        &ctx,
        flange.clone(),
        vec![Point1Sec::new(flange.clone())],
        config,
        None,
    )
    .unwrap_err();
    assert!(matches!(err, CompressorError::MissingAuxiliaryData { .. }));

    let oil = BearingOil {
        t_in: k(T_ZERO_C + 45.0),
        journal_de: Some(OilStream {
            flow: m3ps(0.5e-3),
            t_out: k(T_ZERO_C + 60.0),
        }),
        journal_nde: None,
        thrust: None,
        properties: OilProperties::Iso(IsoVg::Vg46),
    };
    let test = Point1Sec {
        oil: Some(oil),
        ..Point1Sec::new(flange.clone())
    };
    let assembly = StraightThrough::new(&ctx, flange, vec![test], config, None).unwrap();
    let losses = assembly.mechanical_losses().value;
    assert!((losses - oil.loss().unwrap().value).abs() < 1e-6);
    assert!(
        (assembly.shaft_power().value - assembly.point_guarantee().power().value - losses).abs()
            < 1e-6
    );
}

fn back_to_back_test(
    ctx: &PerfContext<'_>,
    model: &PengRobinsonModel,
) -> (Point, Point) {
    let first = example(ctx, model);
    let second = Point::new(
        ctx,
        PointInput::DischSuc {
            suc: state(model, 5.9, 310.0),
            disch: state(model, 15.0, 410.0),
        },
        Flow::Mass(kgps(7.737)),
        rpm(7894.0),
        Geometry::new(mm(20.0), mm(365.0)),
    )
    .unwrap();
    (first, second)
}

#[test]
fn back_to_back_without_corrections_reproduces_test() {
    let model = PengRobinsonModel::new();
    let ctx = PerfContext::new(&model, PolytropicMethod::Schultz);
    let (first, second) = back_to_back_test(&ctx, &model);
    let test = BackToBackTest {
        first: PointFirstSection::new(first.clone()),
        second: PointSecondSection::new(second.clone()),
    };

    let assembly = BackToBack::new(
        &ctx,
        first.clone(),
        second.clone(),
        vec![test],
        CorrectionConfig::default(),
        None,
    )
    .unwrap();
    let g2 = assembly.point_second_guarantee();
    assert!((g2.disch().p().value / second.disch().p().value - 1.0).abs() < 1e-4);
    assert!((assembly.power_ratio() - 1.0).abs() < 1e-4);
    assert!((assembly.ratios_first().head - 1.0).abs() < 1e-4);
}

#[test]
fn back_to_back_leakages_move_flow_between_sections() {
    let model = PengRobinsonModel::new();
    let ctx = PerfContext::new(&model, PolytropicMethod::Schultz);
    let (first, second) = back_to_back_test(&ctx, &model);
    let test = BackToBackTest {
        first: PointFirstSection {
            division_wall_flow: Some(kgps(0.15)),
            ..PointFirstSection::new(first.clone())
        },
        second: PointSecondSection {
            balance_line_flow: Some(kgps(0.1)),
            ..PointSecondSection::new(second.clone())
        },
    };
    let config = CorrectionConfig {
        leakages: true,
        ..CorrectionConfig::default()
    };

    let assembly =
        BackToBack::new(&ctx, first.clone(), second.clone(), vec![test], config, None).unwrap();
    let converted = &assembly.points()[0];
    assert!((converted.first.rotor_test.flow_m().value - (7.737 + 0.1)).abs() < 1e-9);
    assert!((converted.second.rotor_test.flow_m().value - (7.737 - 0.1)).abs() < 1e-9);
    // Hot division-wall gas is removed from the first-section discharge.
    assert!(converted.first.rotor_test.disch().t() < first.disch().t());

    // At the test conditions the flange flows come back.
    assert!((converted.first.flange_sp.flow_m().value / 7.737 - 1.0).abs() < 1e-3);
    assert!((converted.second.flange_sp.flow_m().value / 7.737 - 1.0).abs() < 1e-3);
}

#[test]
fn back_to_back_speed_match_reproduces_second_discharge_pressure() {
    let model = PengRobinsonModel::new();
    let ctx = PerfContext::new(&model, PolytropicMethod::Schultz);
    let (first, second) = back_to_back_test(&ctx, &model);
    let guarantee_second = Point::new(
        &ctx,
        PointInput::EffDischPressureSuc {
            suc: second.suc().clone(),
            eff: second.eff(),
            disch_p: bar(15.5),
        },
        Flow::Mass(kgps(7.737)),
        rpm(7894.0),
        Geometry::new(mm(20.0), mm(365.0)),
    )
    .unwrap();
    let test = BackToBackTest {
        first: PointFirstSection::new(first.clone()),
        second: PointSecondSection::new(second),
    };

    let assembly = BackToBack::new(
        &ctx,
        first,
        guarantee_second,
        vec![test],
        CorrectionConfig::default(),
        None,
    )
    .unwrap();
    let matched = assembly
        .calculate_speed_to_match_discharge_pressure(&ctx)
        .unwrap();

    let p_d = matched.point_second_guarantee().disch().p().value;
    assert!((p_d / 15.5e5 - 1.0).abs() < 1e-6, "{p_d}");
    assert!(matched.speed() > assembly.speed());
    assert!(matched.point_first_guarantee().disch().p() > assembly.point_first_guarantee().disch().p());
}

mod mixing {
    use super::*;
    use cc_compressor::leakage::{SealGasSplit, mix_suction};
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn suction_mix_conserves_mass_and_energy(
            flange in 1.0f64..10.0,
            balance_line in 0.0f64..0.5,
            supply_bar in 1.826f64..8.0,
            seal in 0.0f64..0.2,
        ) {
            let model = PengRobinsonModel::new();
            let suc = state(&model, 1.826, 296.7);
            let split = SealGasSplit::new(Some(&SealGas { flow: kgps(seal), t: k(297.7) }));
            let (mixed, flow) =
                mix_suction(&model, &suc, flange, balance_line, &split, bar(supply_bar)).unwrap();

            let expected = flange + balance_line + split.suction;
            prop_assert!((flow - expected).abs() < 1e-12);

            let h_seal = state(&model, supply_bar, 297.7).h();
            let energy = (flange + balance_line) * suc.h() + split.suction * h_seal;
            prop_assert!((mixed.h() - energy / flow).abs() < 0.05);
            prop_assert!(mixed.p() == suc.p());
        }
    }
}
