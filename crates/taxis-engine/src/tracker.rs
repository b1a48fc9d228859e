//! Tabular agent logger.
//!
//! [`CsvTracker`] is an [`Observer`] that writes one comma-separated row
//! per tracked agent each time its [`Cadence`] fires. The column set is
//! configurable; the header row is written when the run starts.

use std::fmt::Write as _;
use std::io::Write;

use taxis_core::{FieldId, PopulationId};

use crate::observer::{Cadence, Observer};
use crate::simulation::{Simulation, TickReport};

/// One output column (or, for [`Position`](Self::Position), three).
#[derive(Clone, Debug, PartialEq)]
pub enum TrackerColumn {
    /// Simulated time, formatted with the tracker's precision.
    Time,
    /// Population index.
    Population,
    /// Agent index within its population.
    AgentIndex,
    /// Species label.
    Species,
    /// `x,y,z` position.
    Position,
    /// Current radius.
    Radius,
    /// Concentration of one fixed cell of a field, repeated on every row.
    CellConcentration {
        /// Sampled field.
        field: FieldId,
        /// Sampled cell.
        cell: [usize; 3],
    },
    /// Concentration of a field at the agent's own position. Empty when
    /// the position falls outside the field's grid.
    LocalConcentration {
        /// Sampled field.
        field: FieldId,
    },
}

/// Writes agent rows to any [`Write`] sink at a fixed simulated-time
/// cadence.
///
/// ```
/// use taxis_core::{BoundBox, DVec3};
/// use taxis_engine::{CsvTracker, Observer, Simulation, SimulationConfig, TrackerColumn};
///
/// let config = SimulationConfig {
///     duration: 0.3,
///     bound: BoundBox::solid(DVec3::splat(10.0)).unwrap(),
///     ..SimulationConfig::default()
/// };
/// let mut sim = Simulation::new(config).unwrap();
/// let mut tracker = CsvTracker::new(Vec::new())
///     .with_columns(vec![TrackerColumn::Time, TrackerColumn::Species]);
/// sim.run(&mut [&mut tracker as &mut dyn Observer]).unwrap();
/// let out = String::from_utf8(tracker.into_inner()).unwrap();
/// assert_eq!(out, "time,species\n");
/// ```
pub struct CsvTracker<W: Write> {
    out: W,
    columns: Vec<TrackerColumn>,
    populations: Option<Vec<PopulationId>>,
    cadence: Cadence,
    precision: usize,
    rows: usize,
    line: String,
}

impl<W: Write> CsvTracker<W> {
    /// A tracker writing `time,species,x,y,z` for every agent on every
    /// tick.
    pub fn new(out: W) -> Self {
        Self {
            out,
            columns: vec![
                TrackerColumn::Time,
                TrackerColumn::Species,
                TrackerColumn::Position,
            ],
            populations: None,
            cadence: Cadence::new(0.0),
            precision: 2,
            rows: 0,
            line: String::new(),
        }
    }

    /// Replace the column set.
    pub fn with_columns(mut self, columns: Vec<TrackerColumn>) -> Self {
        self.columns = columns;
        self
    }

    /// Sample at most once per `interval` of simulated time.
    pub fn with_interval(mut self, interval: f64) -> Self {
        self.cadence = Cadence::new(interval);
        self
    }

    /// Track only the listed populations.
    pub fn with_populations(mut self, populations: Vec<PopulationId>) -> Self {
        self.populations = Some(populations);
        self
    }

    /// Decimals used for the time column.
    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    /// Data rows written so far (excluding the header).
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Recover the sink.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn tracks(&self, id: PopulationId) -> bool {
        self.populations.as_ref().is_none_or(|ids| ids.contains(&id))
    }

    fn check_columns(&self, sim: &Simulation) -> Result<(), String> {
        for col in &self.columns {
            match col {
                TrackerColumn::CellConcentration { field, cell } => {
                    let f = sim
                        .field(*field)
                        .ok_or_else(|| format!("unknown field {field}"))?;
                    f.conc(cell[0], cell[1], cell[2])
                        .map_err(|e| format!("field '{}': {e}", f.name()))?;
                }
                TrackerColumn::LocalConcentration { field } => {
                    if sim.field(*field).is_none() {
                        return Err(format!("unknown field {field}"));
                    }
                }
                _ => {}
            }
        }
        if let Some(ids) = &self.populations {
            if let Some(id) = ids.iter().find(|id| sim.population(**id).is_none()) {
                return Err(format!("unknown population {id}"));
            }
        }
        Ok(())
    }

    fn header(&self, sim: &Simulation) -> String {
        let mut names: Vec<String> = Vec::with_capacity(self.columns.len());
        for col in &self.columns {
            match col {
                TrackerColumn::Time => names.push("time".into()),
                TrackerColumn::Population => names.push("population".into()),
                TrackerColumn::AgentIndex => names.push("agent".into()),
                TrackerColumn::Species => names.push("species".into()),
                TrackerColumn::Position => names.push("x,y,z".into()),
                TrackerColumn::Radius => names.push("radius".into()),
                TrackerColumn::CellConcentration { field, cell } => {
                    let name = sim.field(*field).map_or("?", |f| f.name());
                    names.push(format!("{name}[{} {} {}]", cell[0], cell[1], cell[2]));
                }
                TrackerColumn::LocalConcentration { field } => {
                    names.push(sim.field(*field).map_or("?", |f| f.name()).to_string());
                }
            }
        }
        names.join(",")
    }

    fn write_rows(&mut self, sim: &Simulation) -> std::io::Result<()> {
        let time = sim.formatted_time(self.precision);
        for pop in sim.populations() {
            if !self.tracks(pop.id()) {
                continue;
            }
            for (index, agent) in pop.agents().iter().enumerate() {
                self.line.clear();
                for (n, col) in self.columns.iter().enumerate() {
                    if n > 0 {
                        self.line.push(',');
                    }
                    // Writing into a String cannot fail.
                    let _ = match col {
                        TrackerColumn::Time => write!(self.line, "{time}"),
                        TrackerColumn::Population => write!(self.line, "{}", pop.id()),
                        TrackerColumn::AgentIndex => write!(self.line, "{index}"),
                        TrackerColumn::Species => write!(self.line, "{}", agent.species()),
                        TrackerColumn::Position => {
                            let p = agent.position();
                            write!(self.line, "{},{},{}", p.x, p.y, p.z)
                        }
                        TrackerColumn::Radius => write!(self.line, "{}", agent.radius()),
                        TrackerColumn::CellConcentration { field, cell } => {
                            match sim.field(*field).and_then(|f| f.conc(cell[0], cell[1], cell[2]).ok()) {
                                Some(c) => write!(self.line, "{c}"),
                                None => Ok(()),
                            }
                        }
                        TrackerColumn::LocalConcentration { field } => {
                            match sim.fields().conc_at(*field, agent.position()) {
                                Some(c) => write!(self.line, "{c}"),
                                None => Ok(()),
                            }
                        }
                    };
                }
                self.line.push('\n');
                self.out.write_all(self.line.as_bytes())?;
                self.rows += 1;
            }
        }
        Ok(())
    }
}

impl<W: Write> Observer for CsvTracker<W> {
    fn name(&self) -> &str {
        "csv-tracker"
    }

    fn before_run(&mut self, sim: &Simulation) -> Result<(), String> {
        self.check_columns(sim)?;
        self.cadence.reset();
        let header = self.header(sim);
        writeln!(self.out, "{header}").map_err(|e| e.to_string())
    }

    fn after_tick(&mut self, sim: &Simulation, report: &TickReport) -> Result<(), String> {
        if !self.cadence.due(report.time) {
            return Ok(());
        }
        self.write_rows(sim).map_err(|e| e.to_string())
    }

    fn after_run(&mut self, _sim: &Simulation) -> Result<(), String> {
        self.out.flush().map_err(|e| e.to_string())
    }
}
