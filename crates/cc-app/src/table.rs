//! Tabular evaluation of test points.
//!
//! Input is comma-separated text whose header names the point inputs with
//! an optional unit tag, e.g. `suction_pressure[bar]`. Besides the point
//! itself a row may carry the auxiliary readings of a single-section test:
//! balance-line flow, seal gas, end-seal upstream conditions, casing and
//! bearing oil. Every data row is closed as a test point and converted to the
//! guarantee suction and operating speed of a project with the project's
//! corrections, one row at a time. Rows that cannot be evaluated are kept in
//! the report with their line number and the reason.

use std::collections::HashMap;

use cc_compressor::{ConvertedPoint, convert_test_point};
use cc_fluids::Quantity;
use cc_point::Point;
use cc_project::{
    CasingDef, CompressorDef, IsoVgDef, OilDef, OilPropertiesDef, OilStreamDef, PointDef,
    Project, SealGasDef, StraightThroughTestDef, UpstreamDef,
};
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::build::{
    Engine, build_composition, build_config, build_geometry, build_guarantee, build_point_1sec,
    project_speed,
};
use crate::error::{AppError, AppResult};

/// Which section's guarantee and geometry the rows belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TableSection {
    #[default]
    First,
    Second,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Column {
    SuctionPressure,
    SuctionTemperature,
    DischargePressure,
    DischargeTemperature,
    Eff,
    Head,
    VolumeRatio,
    MassFlow,
    VolumeFlow,
    Speed,
    BalanceLineFlow,
    SealGasFlow,
    SealGasTemperature,
    EndSealUpstreamPressure,
    EndSealUpstreamTemperature,
    CasingArea,
    CasingTemperature,
    AmbientTemperature,
    OilInletTemperature,
    JournalDeOilFlow,
    JournalDeOilTemperature,
    JournalNdeOilFlow,
    JournalNdeOilTemperature,
    ThrustOilFlow,
    ThrustOilTemperature,
    OilGrade,
}

impl Column {
    fn parse(name: &str) -> Option<Self> {
        Some(match name {
            "suction_pressure" => Column::SuctionPressure,
            "suction_temperature" => Column::SuctionTemperature,
            "discharge_pressure" => Column::DischargePressure,
            "discharge_temperature" => Column::DischargeTemperature,
            "eff" => Column::Eff,
            "head" => Column::Head,
            "volume_ratio" => Column::VolumeRatio,
            "mass_flow" => Column::MassFlow,
            "volume_flow" => Column::VolumeFlow,
            "speed" => Column::Speed,
            "balance_line_flow" => Column::BalanceLineFlow,
            "seal_gas_flow" => Column::SealGasFlow,
            "seal_gas_temperature" => Column::SealGasTemperature,
            "end_seal_upstream_pressure" => Column::EndSealUpstreamPressure,
            "end_seal_upstream_temperature" => Column::EndSealUpstreamTemperature,
            "casing_area" => Column::CasingArea,
            "casing_temperature" => Column::CasingTemperature,
            "ambient_temperature" => Column::AmbientTemperature,
            "oil_inlet_temperature" => Column::OilInletTemperature,
            "journal_de_oil_flow" => Column::JournalDeOilFlow,
            "journal_de_oil_temperature" => Column::JournalDeOilTemperature,
            "journal_nde_oil_flow" => Column::JournalNdeOilFlow,
            "journal_nde_oil_temperature" => Column::JournalNdeOilTemperature,
            "thrust_oil_flow" => Column::ThrustOilFlow,
            "thrust_oil_temperature" => Column::ThrustOilTemperature,
            "oil_grade" => Column::OilGrade,
            _ => return None,
        })
    }
}

/// Pairs of columns that only make sense together.
const PAIRED: [(Column, Column, &str); 6] = [
    (Column::SealGasFlow, Column::SealGasTemperature, "seal_gas"),
    (
        Column::EndSealUpstreamPressure,
        Column::EndSealUpstreamTemperature,
        "end_seal_upstream",
    ),
    (Column::CasingTemperature, Column::AmbientTemperature, "casing"),
    (Column::JournalDeOilFlow, Column::JournalDeOilTemperature, "journal_de_oil"),
    (Column::JournalNdeOilFlow, Column::JournalNdeOilTemperature, "journal_nde_oil"),
    (Column::ThrustOilFlow, Column::ThrustOilTemperature, "thrust_oil"),
];

#[derive(Debug, Clone)]
struct Header {
    columns: Vec<(Column, String)>,
}

/// Non-empty cells of one row, unit tags attached.
struct Cells(HashMap<Column, String>);

impl Cells {
    fn take(&mut self, column: Column) -> Option<String> {
        self.0.remove(&column)
    }

    /// Both cells of a pair, or neither.
    fn pair(
        &mut self,
        a: Column,
        b: Column,
        name: &str,
    ) -> Result<Option<(String, String)>, String> {
        match (self.take(a), self.take(b)) {
            (Some(x), Some(y)) => Ok(Some((x, y))),
            (None, None) => Ok(None),
            _ => Err(format!("{name} needs both of its readings")),
        }
    }

    fn oil_stream(
        &mut self,
        flow: Column,
        t: Column,
        name: &str,
    ) -> Result<Option<OilStreamDef>, String> {
        Ok(self
            .pair(flow, t, name)?
            .map(|(flow, outlet_temperature)| OilStreamDef {
                flow,
                outlet_temperature,
            }))
    }
}

impl Header {
    fn parse(line: &str) -> AppResult<Self> {
        let mut columns: Vec<(Column, String)> = Vec::new();
        for raw in line.split(',') {
            let raw = raw.trim();
            let (name, unit) = match raw.split_once('[') {
                Some((name, rest)) => {
                    let unit = rest.strip_suffix(']').ok_or_else(|| AppError::TableHeader {
                        reason: format!("unterminated unit in '{raw}'"),
                    })?;
                    (name.trim(), unit.trim().to_string())
                }
                None => (raw, String::new()),
            };
            let column = Column::parse(name).ok_or_else(|| AppError::TableHeader {
                reason: format!("unknown column '{name}'"),
            })?;
            if columns.iter().any(|(c, _)| *c == column) {
                return Err(AppError::TableHeader {
                    reason: format!("duplicate column '{name}'"),
                });
            }
            columns.push((column, unit));
        }

        let has = |c: Column| columns.iter().any(|(col, _)| *col == c);
        for required in [
            Column::SuctionPressure,
            Column::SuctionTemperature,
            Column::Speed,
        ] {
            if !has(required) {
                return Err(AppError::TableHeader {
                    reason: format!("missing column {required:?}"),
                });
            }
        }
        if !(has(Column::MassFlow) || has(Column::VolumeFlow)) {
            return Err(AppError::TableHeader {
                reason: "one of mass_flow or volume_flow is required".to_string(),
            });
        }
        for (a, b, name) in PAIRED {
            if has(a) != has(b) {
                return Err(AppError::TableHeader {
                    reason: format!("{name} columns come in pairs: {a:?} and {b:?}"),
                });
            }
        }
        if has(Column::CasingArea) != has(Column::CasingTemperature) {
            return Err(AppError::TableHeader {
                reason: "casing_area needs casing_temperature and ambient_temperature".to_string(),
            });
        }
        Ok(Self { columns })
    }

    fn cells(&self, cells: &[&str]) -> Result<Cells, String> {
        if cells.len() != self.columns.len() {
            return Err(format!(
                "found {} of {} fields",
                cells.len(),
                self.columns.len()
            ));
        }
        let mut map = HashMap::new();
        for ((column, unit), cell) in self.columns.iter().zip(cells) {
            let cell = cell.trim();
            if cell.is_empty() {
                continue;
            }
            let text = if unit.is_empty() {
                cell.to_string()
            } else {
                format!("{cell} {unit}")
            };
            map.insert(*column, text);
        }
        Ok(Cells(map))
    }

    /// Row cells as a single-section test definition, units attached.
    fn test_def(&self, cells: &[&str]) -> Result<StraightThroughTestDef, String> {
        let mut cells = self.cells(cells)?;
        let volume_ratio = cells
            .take(Column::VolumeRatio)
            .map(|text| {
                cc_fluids::parse_quantity(&text, Quantity::Dimensionless)
                    .map_err(|e| format!("volume_ratio: {e}"))
            })
            .transpose()?;
        let mut required = |column: Column, name: &str| {
            cells.take(column).ok_or_else(|| format!("missing {name}"))
        };
        let suction_pressure = required(Column::SuctionPressure, "suction_pressure")?;
        let suction_temperature = required(Column::SuctionTemperature, "suction_temperature")?;
        let speed = required(Column::Speed, "speed")?;
        let point = PointDef {
            suction_pressure,
            suction_temperature,
            discharge_pressure: cells.take(Column::DischargePressure),
            discharge_temperature: cells.take(Column::DischargeTemperature),
            eff: cells.take(Column::Eff),
            head: cells.take(Column::Head),
            volume_ratio,
            mass_flow: cells.take(Column::MassFlow),
            volume_flow: cells.take(Column::VolumeFlow),
            speed,
        };

        let seal_gas = cells
            .pair(Column::SealGasFlow, Column::SealGasTemperature, "seal_gas")?
            .map(|(flow, temperature)| SealGasDef { flow, temperature });
        let end_seal_upstream = cells
            .pair(
                Column::EndSealUpstreamPressure,
                Column::EndSealUpstreamTemperature,
                "end_seal_upstream",
            )?
            .map(|(pressure, temperature)| UpstreamDef {
                pressure,
                temperature,
            });
        let casing = match cells.take(Column::CasingArea) {
            Some(area) => cells
                .pair(Column::CasingTemperature, Column::AmbientTemperature, "casing")?
                .map(|(temperature, ambient_temperature)| CasingDef {
                    area,
                    temperature,
                    ambient_temperature,
                }),
            None => None,
        };

        let journal_de = cells.oil_stream(
            Column::JournalDeOilFlow,
            Column::JournalDeOilTemperature,
            "journal_de_oil",
        )?;
        let journal_nde = cells.oil_stream(
            Column::JournalNdeOilFlow,
            Column::JournalNdeOilTemperature,
            "journal_nde_oil",
        )?;
        let thrust =
            cells.oil_stream(Column::ThrustOilFlow, Column::ThrustOilTemperature, "thrust_oil")?;
        let grade = cells.take(Column::OilGrade).map(|g| parse_grade(&g)).transpose()?;
        let oil = match cells.take(Column::OilInletTemperature) {
            Some(inlet_temperature) => Some(OilDef {
                inlet_temperature,
                journal_de,
                journal_nde,
                thrust,
                properties: OilPropertiesDef::Iso {
                    grade: grade.unwrap_or_default(),
                },
            }),
            None if journal_de.is_some() || journal_nde.is_some() || thrust.is_some() => {
                return Err("oil streams need oil_inlet_temperature".to_string());
            }
            None => None,
        };

        Ok(StraightThroughTestDef {
            point,
            balance_line_flow: cells.take(Column::BalanceLineFlow),
            seal_gas,
            end_seal_upstream,
            casing,
            oil,
        })
    }
}

fn parse_grade(text: &str) -> Result<IsoVgDef, String> {
    match text.trim().to_ascii_lowercase().replace([' ', '-'], "").as_str() {
        "vg32" | "isovg32" => Ok(IsoVgDef::Vg32),
        "vg46" | "isovg46" => Ok(IsoVgDef::Vg46),
        "vg68" | "isovg68" => Ok(IsoVgDef::Vg68),
        _ => Err(format!("unknown oil grade '{text}'")),
    }
}

/// A row that was evaluated.
#[derive(Debug, Clone)]
pub struct TableRow {
    pub line: usize,
    pub test: Point,
    pub converted: ConvertedPoint,
}

/// A row that could not be evaluated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlaggedRow {
    pub line: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct TableReport {
    pub rows: Vec<TableRow>,
    pub flagged: Vec<FlaggedRow>,
}

const OUTPUT_HEADER: &str = "line,eff,head[J/kg],power[W],volume_flow[m3/s],phi,psi,\
rotor_eff,rotor_mass_flow[kg/s],\
converted_suction_pressure[Pa],converted_suction_temperature[K],\
converted_discharge_pressure[Pa],converted_discharge_temperature[K],\
converted_volume_flow[m3/s],converted_mass_flow[kg/s],converted_head[J/kg],\
converted_eff,converted_power[W],converted_bearing_loss[W],converted_speed[rpm],status";

impl TableReport {
    /// Evaluated and flagged rows in input order, one output line each.
    pub fn to_csv(&self) -> String {
        let fields = OUTPUT_HEADER.split(',').count();
        let mut lines: Vec<(usize, String)> = Vec::with_capacity(self.rows.len() + self.flagged.len());
        for r in &self.rows {
            let (t, rotor, c) = (&r.test, &r.converted.rotor_test, &r.converted.flange_sp);
            let loss = r.converted.bearing_loss_sp.map_or(0.0, |l| l.value);
            lines.push((
                r.line,
                format!(
                    "{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},ok",
                    r.line,
                    t.eff(),
                    t.head(),
                    t.power().value,
                    t.flow_v().value,
                    t.phi(),
                    t.psi(),
                    rotor.eff(),
                    rotor.flow_m().value,
                    c.suc().p().value,
                    c.suc().t().value,
                    c.disch().p().value,
                    c.disch().t().value,
                    c.flow_v().value,
                    c.flow_m().value,
                    c.head(),
                    c.eff(),
                    c.power().value,
                    loss,
                    cc_core::units::to_rpm(c.speed()),
                ),
            ));
        }
        for f in &self.flagged {
            lines.push((
                f.line,
                format!(
                    "{}{}\"{}\"",
                    f.line,
                    ",".repeat(fields - 1),
                    f.reason.replace('"', "'").replace(',', ";")
                ),
            ));
        }
        lines.sort_by_key(|(line, _)| *line);

        let mut csv = String::from(OUTPUT_HEADER);
        csv.push('\n');
        for (_, l) in lines {
            csv.push_str(&l);
            csv.push('\n');
        }
        csv
    }
}

/// Evaluate every row of `text` against the guarantee of `section`. Each row
/// is treated as a single-section test point.
pub fn evaluate_table(
    project: &Project,
    section: TableSection,
    text: &str,
) -> AppResult<TableReport> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l))
        .filter(|(_, l)| !l.trim().is_empty() && !l.trim_start().starts_with('#'));
    let (_, header_line) = lines.next().ok_or_else(|| AppError::TableHeader {
        reason: "empty table".to_string(),
    })?;
    let header = Header::parse(header_line)?;
    let rows: Vec<(usize, &str)> = lines.collect();

    let engine = Engine::for_project(project);
    let ctx = engine.context();
    let second = section == TableSection::Second;
    let guarantee = build_guarantee(&ctx, project, second)?;
    let geometry = match (&project.compressor, second) {
        (CompressorDef::StraightThrough { geometry, .. }, _) => {
            build_geometry("geometry", geometry)?
        }
        (CompressorDef::BackToBack { geometry_first, .. }, false) => {
            build_geometry("geometry_first", geometry_first)?
        }
        (CompressorDef::BackToBack { geometry_second, .. }, true) => {
            build_geometry("geometry_second", geometry_second)?
        }
    };
    let composition = build_composition(&project.fluid)?;
    let config = build_config(&project.corrections);
    let speed = project_speed(project)?.unwrap_or(guarantee.speed());

    let results: Vec<Result<TableRow, FlaggedRow>> = rows
        .par_iter()
        .map(|&(line, text)| {
            let flag = |reason: String| FlaggedRow { line, reason };
            let cells: Vec<&str> = text.split(',').collect();
            let def = header.test_def(&cells).map_err(flag)?;
            let name = format!("line {line}");
            let test = build_point_1sec(&ctx, &composition, &name, &def, geometry)
                .map_err(|e| flag(e.to_string()))?;
            let converted = convert_test_point(&ctx, &config, &test, &guarantee, speed)
                .map_err(|e| flag(e.to_string()))?;
            Ok(TableRow {
                line,
                test: test.point,
                converted,
            })
        })
        .collect();

    let mut report = TableReport::default();
    for r in results {
        match r {
            Ok(row) => report.rows.push(row),
            Err(flagged) => {
                warn!(line = flagged.line, reason = %flagged.reason, "table row flagged");
                report.flagged.push(flagged);
            }
        }
    }
    debug!(
        evaluated = report.rows.len(),
        flagged = report.flagged.len(),
        "table evaluated"
    );
    Ok(report)
}
