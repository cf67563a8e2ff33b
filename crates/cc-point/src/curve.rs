//! Performance curves at constant speed.

use crate::error::{PerfError, PerfResult};
use crate::point::{Flow, PerfContext, Point, PointInput};
use cc_core::units::{AngularVelocity, VolumeRate, m3ps};
use cc_solver::Polynomial;

/// Maximum degree of the fitted curve polynomials.
const MAX_DEGREE: usize = 3;

/// Points at one speed and composition, ordered by volume flow, with
/// polynomial fits of head, efficiency, power and discharge conditions
/// against volume flow.
#[derive(Debug, Clone)]
pub struct Curve {
    points: Vec<Point>,
    head: Polynomial,
    eff: Polynomial,
    power: Polynomial,
    disch_p: Polynomial,
    disch_t: Polynomial,
}

impl Curve {
    pub fn new(mut points: Vec<Point>) -> PerfResult<Self> {
        if points.len() < 2 {
            return Err(PerfError::InvalidArg {
                what: "a curve needs at least two points",
            });
        }
        let first = &points[0];
        let speed = first.speed().value;
        if points
            .iter()
            .any(|p| (p.speed().value - speed).abs() > 1e-9 * speed)
        {
            return Err(PerfError::InvalidArg {
                what: "curve points must share one speed",
            });
        }
        if points
            .iter()
            .any(|p| p.suc().composition() != first.suc().composition())
        {
            return Err(PerfError::InvalidArg {
                what: "curve points must share one composition",
            });
        }

        points.sort_by(|a, b| a.flow_v().value.total_cmp(&b.flow_v().value));
        let degree = MAX_DEGREE.min(points.len() - 1);
        let x: Vec<f64> = points.iter().map(|p| p.flow_v().value).collect();
        let fit = |f: &dyn Fn(&Point) -> f64| -> PerfResult<Polynomial> {
            let y: Vec<f64> = points.iter().map(f).collect();
            Ok(Polynomial::fit(&x, &y, degree)?)
        };

        Ok(Self {
            head: fit(&|p| p.head())?,
            eff: fit(&|p| p.eff())?,
            power: fit(&|p| p.power().value)?,
            disch_p: fit(&|p| p.disch().p().value)?,
            disch_t: fit(&|p| p.disch().t().value)?,
            points,
        })
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn speed(&self) -> AngularVelocity {
        self.points[0].speed()
    }

    /// Flow range covered by the points.
    pub fn flow_range(&self) -> (VolumeRate, VolumeRate) {
        (
            self.points[0].flow_v(),
            self.points[self.points.len() - 1].flow_v(),
        )
    }

    /// Polytropic head [J/kg] at `flow_v`.
    pub fn head_at(&self, flow_v: VolumeRate) -> f64 {
        self.head.eval(flow_v.value)
    }

    pub fn eff_at(&self, flow_v: VolumeRate) -> f64 {
        self.eff.eval(flow_v.value)
    }

    /// Gas power [W] at `flow_v`.
    pub fn power_at(&self, flow_v: VolumeRate) -> f64 {
        self.power.eval(flow_v.value)
    }

    /// Discharge pressure [Pa] at `flow_v`.
    pub fn disch_p_at(&self, flow_v: VolumeRate) -> f64 {
        self.disch_p.eval(flow_v.value)
    }

    /// Discharge temperature [K] at `flow_v`.
    pub fn disch_t_at(&self, flow_v: VolumeRate) -> f64 {
        self.disch_t.eval(flow_v.value)
    }

    /// Closed point on the curve at `flow_v`, from the first point's suction.
    pub fn point_at(&self, ctx: &PerfContext<'_>, flow_v: VolumeRate) -> PerfResult<Point> {
        let first = &self.points[0];
        Point::new(
            ctx,
            PointInput::EffHeadSuc {
                suc: first.suc().clone(),
                eff: self.eff_at(flow_v),
                head: self.head_at(flow_v),
            },
            Flow::Volume(m3ps(flow_v.value)),
            first.speed(),
            *first.geometry(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::Geometry;
    use crate::polytropic::PolytropicMethod;
    use cc_core::units::{bar, k, mm, rpm};
    use cc_fluids::{Composition, FluidModel, PengRobinsonModel, Species, StateInput, ThermoState};

    fn suction(model: &PengRobinsonModel, species: Species) -> ThermoState {
        model
            .state(
                StateInput::PT {
                    p: bar(1.0),
                    t: k(300.0),
                },
                Composition::pure(species),
            )
            .unwrap()
    }

    fn point(ctx: &PerfContext<'_>, suc: ThermoState, q: f64, head: f64, eff: f64) -> Point {
        Point::new(
            ctx,
            PointInput::EffHeadSuc { suc, eff, head },
            Flow::Volume(m3ps(q)),
            rpm(12_000.0),
            Geometry::new(mm(20.0), mm(300.0)),
        )
        .unwrap()
    }

    #[test]
    fn sorts_by_flow_and_interpolates() {
        let model = PengRobinsonModel::new();
        let ctx = PerfContext::new(&model, PolytropicMethod::Schultz);
        let suc = suction(&model, Species::N2);
        let curve = Curve::new(vec![
            point(&ctx, suc.clone(), 1.4, 60e3, 0.76),
            point(&ctx, suc.clone(), 1.0, 70e3, 0.80),
            point(&ctx, suc, 1.2, 66e3, 0.79),
        ])
        .unwrap();

        let flows: Vec<f64> = curve.points().iter().map(|p| p.flow_v().value).collect();
        assert_eq!(flows, vec![1.0, 1.2, 1.4]);
        assert!((curve.head_at(m3ps(1.2)) - curve.points()[1].head()).abs() < 1e-3);
        assert!((curve.eff_at(m3ps(1.0)) - 0.80).abs() < 1e-6);

        let mid = curve.point_at(&ctx, m3ps(1.1)).unwrap();
        assert!((mid.eff() - curve.eff_at(m3ps(1.1))).abs() < 1e-6);
        assert!(mid.head() < 70e3 && mid.head() > 66e3);
    }

    #[test]
    fn rejects_single_point_and_mixed_fluids() {
        let model = PengRobinsonModel::new();
        let ctx = PerfContext::new(&model, PolytropicMethod::Schultz);
        let n2 = point(&ctx, suction(&model, Species::N2), 1.0, 70e3, 0.8);
        assert!(matches!(
            Curve::new(vec![n2.clone()]),
            Err(PerfError::InvalidArg { .. })
        ));

        let co2 = point(&ctx, suction(&model, Species::CO2), 1.2, 60e3, 0.8);
        assert!(matches!(
            Curve::new(vec![n2, co2]),
            Err(PerfError::InvalidArg { .. })
        ));
    }
}
