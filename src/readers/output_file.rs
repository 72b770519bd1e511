// internal modules
use crate::error::{Error, Result};
use crate::options::SolutionType;
use crate::readers::parsers;
use crate::result::{Convergence, RegionTotals, Solution, SolverResult};
use crate::utils::*;

// standard library
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

// external crates
use kdam::{Bar, BarBuilder, BarExt};
use log::{debug, trace, warn};

const TOTALS_TABLE: &str = "REGION TOTALS";

/// Name of the group flux table of a solution, as used in errors
fn flux_table_name(solution: SolutionType) -> &'static str {
    match solution {
        SolutionType::Adjoint => "ADJOINT REGION GROUP FLUX INTEGRALS",
        _ => "REAL REGION GROUP FLUX INTEGRALS",
    }
}

/// Reader for the printed DIF3D output
///
/// Scalars (eigenvalue, convergence) and the region tables are pulled out
/// of the output in a single pass:
///     - `REAL PROBLEM` / `ADJOINT PROBLEM` switch which solution is active
///     - The last `K-EFFECTIVE =` of each solution wins
///     - `ITERATIONS HAVE CONVERGED` marks the active solution converged
///     - `REGION TOTALS` pages of up to 10 regions are stitched together
///     - Group flux pages of up to 6 groups are stitched per region
///     - Page ejects are skipped, and a `(CONTINUED)` marker adds pages to
///       the table already started
///
/// Notes:
///     - Every requested solution type must be present
///     - A missing convergence message is an annotation, not a failure
///     - All tables must list the same regions in the same order
///     - Exponents missing the `E` are handled e.g. 1.0-100 => 1.0E-100
///
/// Example:
/// ```ignore
///     let mut reader = OutputReader::new();
///     reader.set_solution(SolutionType::RealAndAdjoint);
///     let result = reader.parse(Path::new("dif3d.out")).unwrap();
/// ```
#[derive(Debug)]
pub struct OutputReader {
    /// Solution types that must be found in the output
    solution: SolutionType,
    /// Region labels the tables are checked against, if known
    expected_regions: Option<Vec<String>>,
    /// Disable progress bar?
    disable_progress: bool,
    /// Tracking of the section currently being read
    tracked: Tracked,
    real: Scalars,
    adjoint: Scalars,
    totals: Option<TotalsTable>,
    real_flux: Option<FluxTable>,
    adjoint_flux: Option<FluxTable>,
}

impl Default for OutputReader {
    fn default() -> Self {
        Self {
            solution: SolutionType::Real,
            expected_regions: None,
            disable_progress: false,
            tracked: Tracked::default(),
            real: Scalars::default(),
            adjoint: Scalars::default(),
            totals: None,
            real_flux: None,
            adjoint_flux: None,
        }
    }
}

/// High level methods
impl OutputReader {
    /// Just calls Default::default(), nothing special to be initialised
    pub fn new() -> Self {
        Default::default()
    }

    /// Parse a DIF3D output file
    pub fn parse(&mut self, path: &Path) -> Result<SolverResult> {
        debug!("Reading DIF3D output from {}", path.display());
        let file = File::open(path)?;
        self.parse_reader(BufReader::new(file))
    }

    /// Parse DIF3D output already held in memory
    pub fn parse_str(&mut self, text: &str) -> Result<SolverResult> {
        self.parse_reader(text.as_bytes())
    }

    /// Which solution types to require, real only by default
    pub fn set_solution(&mut self, solution: SolutionType) {
        self.solution = solution;
    }

    /// Region labels in solver order that every table must match
    pub fn set_expected_regions(&mut self, regions: Vec<String>) {
        self.expected_regions = Some(regions);
    }

    /// Do not print the progress indicators
    pub fn disable_progress(&mut self) {
        debug!("Progress bar disabled");
        self.disable_progress = true;
    }
}

/// Primary run loop
impl OutputReader {
    fn parse_reader<R: BufRead>(&mut self, reader: R) -> Result<SolverResult> {
        self.reset();
        let hints = Self::init_hints();
        let mut progress_bar = self.init_progress_bar()?;

        if !self.disable_progress {
            progress_bar.refresh()?;
        }

        for line in reader.lines() {
            progress_bar.update(1)?;
            let line = line?;
            self.tracked.line += 1;

            match self.tracked.section {
                Section::RegionTotals => {
                    self.read_totals_line(&line)?;
                    continue;
                }
                Section::GroupFlux(solution) => {
                    if self.read_flux_line(solution, &line)? {
                        continue;
                    }
                    // anything else ends the table, and may start something new
                    self.tracked.section = Section::Scalars;
                }
                Section::Scalars => (),
            }

            self.read_scalar_line(&line, &hints)?;
        }

        // need an extra line for clean spacing if the progress bar is printed
        if !self.disable_progress {
            eprintln!()
        };

        if self.tracked.section == Section::RegionTotals {
            return Err(Error::parse(
                TOTALS_TABLE,
                "output ends before the REACTION INTEGRALS edit",
            ));
        }

        self.build_result()
    }

    /// Initialises the hints used to classify lines outside of tables
    fn init_hints() -> [&'static dyn Fn(&str) -> bool; 6] {
        [
            &parsers::is_region_totals,   // 0 start of the REGION TOTALS edit
            &parsers::is_flux_table,      // 1 start of a group flux table
            &parsers::is_real_problem,    // 2 real solution follows
            &parsers::is_adjoint_problem, // 3 adjoint solution follows
            &parsers::is_keff,            // 4 eigenvalue
            &parsers::is_converged,       // 5 convergence message
        ]
    }

    /// Initialise the progress bar, if wanted
    fn init_progress_bar(&self) -> Result<Bar> {
        BarBuilder::default()
            .delay(0.0)
            .unit(" lines")
            .unit_scale(true)
            .disable(self.disable_progress)
            .build()
            .map_err(|e| Error::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))
    }

    /// Start from a clean slate so a reader can be reused
    fn reset(&mut self) {
        self.tracked = Tracked {
            context: self.solution.components()[0],
            ..Default::default()
        };
        self.real = Scalars::default();
        self.adjoint = Scalars::default();
        self.totals = None;
        self.real_flux = None;
        self.adjoint_flux = None;
    }

    fn read_scalar_line(&mut self, line: &str, hints: &[&dyn Fn(&str) -> bool; 6]) -> Result<()> {
        let Some(position) = hints.iter().position(|f| f(line)) else {
            return Ok(());
        };

        match position {
            0 => {
                trace!("[{}] REGION TOTALS", self.tracked.line);
                self.totals = Some(TotalsTable::default());
                self.tracked.section = Section::RegionTotals;
            }
            1 => {
                // safe as the hint has already matched
                let solution = parsers::flux_table_marker(line).unwrap_or(SolutionType::Real);
                let n_line = self.tracked.line;
                let table = self.flux_mut(solution);
                if table.is_some() && parsers::is_continued(line) {
                    trace!("[{n_line}] {} continued", flux_table_name(solution));
                } else {
                    trace!("[{n_line}] {}", flux_table_name(solution));
                    *table = Some(FluxTable::default());
                }
                self.tracked.section = Section::GroupFlux(solution);
            }
            2 => {
                trace!("[{}] Real problem", self.tracked.line);
                self.tracked.context = SolutionType::Real;
            }
            3 => {
                trace!("[{}] Adjoint problem", self.tracked.line);
                self.tracked.context = SolutionType::Adjoint;
            }
            4 => {
                let (_, keff) = parsers::keff(line).map_err(|_| {
                    Error::parse(
                        "K-EFFECTIVE",
                        f!("line {}: could not read \"{}\"", self.tracked.line, line.trim()),
                    )
                })?;
                trace!("[{}] {:?} k-eff {keff}", self.tracked.line, self.tracked.context);
                self.scalars_mut().keff = Some(keff);
            }
            5 => {
                trace!("[{}] {:?} converged", self.tracked.line, self.tracked.context);
                self.scalars_mut().converged = true;
            }
            _ => unreachable!(),
        }

        Ok(())
    }

    fn scalars_mut(&mut self) -> &mut Scalars {
        match self.tracked.context {
            SolutionType::Adjoint => &mut self.adjoint,
            _ => &mut self.real,
        }
    }

    fn flux_mut(&mut self, solution: SolutionType) -> &mut Option<FluxTable> {
        match solution {
            SolutionType::Adjoint => &mut self.adjoint_flux,
            _ => &mut self.real_flux,
        }
    }
}

/// REGION TOTALS
impl OutputReader {
    fn read_totals_line(&mut self, line: &str) -> Result<()> {
        let n_line = self.tracked.line;
        let fail = |reason: String| Error::parse(TOTALS_TABLE, f!("line {n_line}: {reason}"));

        let table = match self.totals.as_mut() {
            Some(table) => table,
            None => return Err(fail("table was never started".to_string())),
        };

        if parsers::is_reaction_integrals(line) {
            table.check_page_complete().map_err(fail)?;
            debug!("REGION TOTALS read for {} regions", table.labels.len());
            self.tracked.section = Section::Scalars;
        } else if parsers::is_totals_header(line) {
            table.check_page_complete().map_err(fail)?;
            let regions = parsers::windows(line)
                .into_iter()
                .map(parsers::region_window)
                .collect::<Option<Vec<(usize, &str)>>>()
                .ok_or_else(|| fail(f!("bad region header \"{}\"", line.trim())))?;
            if regions.is_empty() {
                return Err(fail("region header lists no regions".to_string()));
            }
            trace!("[{n_line}] REGION TOTALS page of {} regions", regions.len());
            table.page_size = regions.len();
            table
                .labels
                .extend(regions.into_iter().map(|(_, label)| label.to_string()));
        } else if let Some(lead) = line.get(..parsers::LEAD_WIDTH) {
            let n_regions = table.labels.len();
            let page_size = table.page_size;
            let Some(column) = table.values.column_mut(lead.trim()) else {
                return Ok(());
            };
            if page_size == 0 {
                return Err(fail(f!("{} row before any region header", lead.trim())));
            }
            if column.len() != n_regions - page_size {
                return Err(fail(f!("{} row repeated on one page", lead.trim())));
            }
            let values = parsers::windows(line)
                .into_iter()
                .map(parsers::window_value)
                .collect::<Option<Vec<f64>>>()
                .ok_or_else(|| fail(f!("bad {} values", lead.trim())))?;
            if values.len() != page_size {
                return Err(fail(f!(
                    "{} values for {} regions",
                    values.len(),
                    page_size
                )));
            }
            column.extend(values);
        }

        Ok(())
    }
}

/// Group flux tables
impl OutputReader {
    /// Returns false for any line that does not belong to the table
    fn read_flux_line(&mut self, solution: SolutionType, line: &str) -> Result<bool> {
        let n_line = self.tracked.line;
        let name = flux_table_name(solution);
        let fail = |reason: String| Error::parse(name, f!("line {n_line}: {reason}"));

        let table = match self.flux_mut(solution).as_mut() {
            Some(table) => table,
            None => return Err(fail("table was never started".to_string())),
        };

        if line.trim().is_empty() {
            return Ok(true);
        }

        // a fresh marker is a new edit of the same table, leave it to the hints
        if parsers::flux_table_marker(line) == Some(solution) {
            return Ok(parsers::is_continued(line));
        }

        if parsers::is_flux_header(line) {
            let groups = parsers::windows(line)
                .into_iter()
                .map(|w| match parsers::group_number(w) {
                    Ok((rest, group)) if rest.trim().is_empty() => Some(group),
                    _ => None,
                })
                .collect::<Option<Vec<usize>>>()
                .ok_or_else(|| fail(f!("bad group header \"{}\"", line.trim())))?;
            trace!("[{n_line}] Group page {:?}", groups);
            table.start_page(groups).map_err(fail)?;
            return Ok(true);
        }

        if parsers::is_flux_row(line) {
            let (_, label) = parsers::flux_row_lead(line)
                .ok_or_else(|| fail(f!("bad region lead \"{}\"", line.trim())))?;
            let values = parsers::windows(line)
                .into_iter()
                .map(parsers::window_value)
                .collect::<Option<Vec<f64>>>()
                .ok_or_else(|| fail(f!("bad group flux values for {label}")))?;
            table.add_row(label, values).map_err(fail)?;
            return Ok(true);
        }

        if parsers::is_page_eject(line) {
            trace!("[{n_line}] Page eject");
            return Ok(true);
        }

        Ok(false)
    }
}

/// Assembly and cross-checking of the final result
impl OutputReader {
    fn build_result(&mut self) -> Result<SolverResult> {
        let mut result = SolverResult {
            regions: Vec::new(),
            real: None,
            adjoint: None,
            totals: None,
        };

        // (table name, region labels) of everything found, for the alignment check
        let mut tables: Vec<(&'static str, Vec<String>)> = Vec::new();

        for solution in self.solution.components() {
            let scalars = match solution {
                SolutionType::Adjoint => &self.adjoint,
                _ => &self.real,
            };
            let keff = scalars
                .keff
                .ok_or_else(|| Error::missing(solution, "K-EFFECTIVE"))?;

            let convergence = if scalars.converged {
                Convergence::Converged
            } else {
                warn!("{solution:?} solution has no convergence message");
                Convergence::NotConverged
            };

            let name = flux_table_name(solution);
            let (labels, group_flux) = self
                .flux_mut(solution)
                .take()
                .ok_or_else(|| Error::missing(solution, name))?
                .finish()
                .map_err(|reason| Error::parse(name, reason))?;
            tables.push((name, labels));

            let parsed = Solution {
                solution,
                keff,
                convergence,
                group_flux,
            };
            match solution {
                SolutionType::Adjoint => result.adjoint = Some(parsed),
                _ => result.real = Some(parsed),
            }
        }

        if self.solution.includes_real() {
            let table = self
                .totals
                .take()
                .ok_or_else(|| Error::parse(TOTALS_TABLE, "table not found"))?;
            if table.labels.is_empty() {
                return Err(Error::parse(TOTALS_TABLE, "no regions found"));
            }
            tables.push((TOTALS_TABLE, table.labels));
            result.totals = Some(table.values);
        }

        result.regions = self.check_alignment(tables)?;
        debug!("Parsed output:\n  > {}", result.summary());
        Ok(result)
    }

    /// Every table must list the same regions in the same order
    fn check_alignment(&self, tables: Vec<(&'static str, Vec<String>)>) -> Result<Vec<String>> {
        let reference = match &self.expected_regions {
            Some(expected) => expected.clone(),
            None => tables.first().map(|(_, l)| l.clone()).unwrap_or_default(),
        };

        for (name, labels) in &tables {
            if labels.len() != reference.len() {
                return Err(Error::parse(
                    name,
                    f!("{} regions, expected {}", labels.len(), reference.len()),
                ));
            }
            if let Some((i, (found, expected))) = labels
                .iter()
                .zip(&reference)
                .enumerate()
                .find(|(_, (a, b))| a != b)
            {
                return Err(Error::parse(
                    name,
                    f!("region {} is {found}, expected {expected}", i + 1),
                ));
            }
        }

        Ok(reference)
    }
}

/// Which part of the output the reader is in
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
enum Section {
    #[default]
    Scalars,
    RegionTotals,
    GroupFlux(SolutionType),
}

/// Tracked state between lines
#[derive(Debug, Default)]
struct Tracked {
    /// Solution the scalar markers currently apply to
    context: SolutionType,
    section: Section,
    /// Current line number, for error messages
    line: usize,
}

/// Scalar results of one solution
#[derive(Debug, Default)]
struct Scalars {
    keff: Option<f64>,
    converged: bool,
}

/// REGION TOTALS as it is being stitched together
#[derive(Debug, Default)]
struct TotalsTable {
    labels: Vec<String>,
    values: RegionTotals,
    /// Number of regions on the current page
    page_size: usize,
}

impl TotalsTable {
    fn check_page_complete(&self) -> std::result::Result<(), String> {
        for (name, column) in self.values.columns() {
            if column.len() != self.labels.len() {
                return Err(f!(
                    "{name} has {} values for {} regions",
                    column.len(),
                    self.labels.len()
                ));
            }
        }
        Ok(())
    }
}

/// A group flux table as it is being stitched together
#[derive(Debug, Default)]
struct FluxTable {
    /// Regions in the order of the first page
    labels: Vec<String>,
    /// Stitched group flux `[region][group]`
    flux: Vec<Vec<f64>>,
    /// Groups on the current page
    page_groups: Vec<usize>,
    /// Next region expected on the current page
    row: usize,
    n_pages: usize,
}

impl FluxTable {
    fn start_page(&mut self, groups: Vec<usize>) -> std::result::Result<(), String> {
        if groups.is_empty() {
            return Err("group header lists no groups".to_string());
        }
        self.check_page_complete()?;

        let n_stitched = self.flux.first().map_or(0, |f| f.len());
        let expected: Vec<usize> = (n_stitched + 1..=n_stitched + groups.len()).collect();
        if groups != expected {
            return Err(f!("groups {groups:?} do not follow group {n_stitched}"));
        }

        self.page_groups = groups;
        self.row = 0;
        self.n_pages += 1;
        Ok(())
    }

    fn add_row(&mut self, label: &str, values: Vec<f64>) -> std::result::Result<(), String> {
        if self.n_pages == 0 {
            return Err(f!("{label} listed before any group header"));
        }
        if values.len() != self.page_groups.len() {
            return Err(f!(
                "{label} has {} values for {} groups",
                values.len(),
                self.page_groups.len()
            ));
        }

        if self.n_pages == 1 {
            self.labels.push(label.to_string());
            self.flux.push(values);
        } else {
            match self.labels.get(self.row) {
                Some(expected) if expected == label => self.flux[self.row].extend(values),
                Some(expected) => {
                    return Err(f!("{label} listed where {expected} was expected"));
                }
                None => return Err(f!("{label} is not on the first page")),
            }
        }

        self.row += 1;
        Ok(())
    }

    fn check_page_complete(&self) -> std::result::Result<(), String> {
        if self.n_pages > 1 && self.row != self.labels.len() {
            return Err(f!(
                "page {} lists {} of {} regions",
                self.n_pages,
                self.row,
                self.labels.len()
            ));
        }
        Ok(())
    }

    fn finish(self) -> std::result::Result<(Vec<String>, Vec<Vec<f64>>), String> {
        if self.labels.is_empty() {
            return Err("no regions found".to_string());
        }
        self.check_page_complete()?;
        Ok((self.labels, self.flux))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use rstest::rstest;

    /// Builds output text in the printed layout
    fn totals(labels: &[&str], power: &[f64]) -> String {
        let mut s = "0                                                       REGION TOTALS\n".to_string();
        s += "     REGION    ";
        for (i, l) in labels.iter().enumerate() {
            s += &f!("{:>5}  {:<6}", i + 1, l);
        }
        s += "\n";
        for row in ["TOTAL FLUX", "PEAK FLUX", "POWER", "POWER DENSITY", "PEAK PWR DENS"] {
            s += &f!(" {row:<14}");
            for p in power {
                s += &f!("{:>13}", p.fortran(5));
            }
            s += "\n";
        }
        s += "0                                        REACTION INTEGRALS IN DIRECTION OF CALCULATION\n";
        s
    }

    fn flux(marker: &str, labels: &[&str], n_groups: usize) -> String {
        paged_flux(marker, labels, n_groups, "")
    }

    /// Group flux table with `page_break` printed before every page but the first
    fn paged_flux(marker: &str, labels: &[&str], n_groups: usize, page_break: &str) -> String {
        let mut s = f!("0   {marker} REGION GROUP FLUX INTEGRALS\n");
        for first in (1..=n_groups).step_by(6) {
            let last = (first + 5).min(n_groups);
            if first > 1 {
                s += page_break;
            }
            s += "\n  REGION  LABEL";
            for g in first..=last {
                s += &f!("{:>13}", f!("GROUP {g}"));
            }
            s += "\n";
            for (i, l) in labels.iter().enumerate() {
                s += &f!("{:>7}  {:<6}", i + 1, l);
                for g in first..=last {
                    s += &f!("{:>13}", ((i + 1) as f64 * 1.0e14 + g as f64 * 1.0e9).fortran(5));
                }
                s += "\n";
            }
        }
        s += "1\n";
        s
    }

    fn real_output(n_groups: usize, converged: bool) -> String {
        let labels = ["A1001A", "A1001B", "A2001A"];
        real_scalars(converged) + &flux("REAL", &labels, n_groups)
    }

    /// Real solution output up to the group flux table
    fn real_scalars(converged: bool) -> String {
        let labels = ["A1001A", "A1001B", "A2001A"];
        let mut s = "0  REAL PROBLEM\n".to_string();
        s += "   OUTER   K-EFFECTIVE =  0.99000000000\n";
        if converged {
            s += "0  OUTER ITERATIONS HAVE CONVERGED\n";
        }
        s += "0            K-EFFECTIVE =  1.00830171984\n";
        s += &totals(&labels, &[1.0e5, 2.0e5, 3.0e5]);
        s
    }

    fn reader(solution: SolutionType) -> OutputReader {
        let mut reader = OutputReader::new();
        reader.disable_progress();
        reader.set_solution(solution);
        reader
    }

    #[test]
    fn last_keff_wins() {
        let result = reader(SolutionType::Real)
            .parse_str(&real_output(4, true))
            .unwrap();
        assert_eq!(result.keff(), Some(1.00830171984));
        assert_eq!(result.real.unwrap().convergence, Convergence::Converged);
    }

    #[test]
    fn pages_are_stitched() {
        let result = reader(SolutionType::Real)
            .parse_str(&real_output(33, true))
            .unwrap();
        let real = result.real.unwrap();
        assert_eq!(real.group_flux.len(), 3);
        assert!(real.group_flux.iter().all(|g| g.len() == 33));
        assert_eq!(real.group_flux[1][32], 2.00033e14);
        assert_eq!(result.regions, vec!["A1001A", "A1001B", "A2001A"]);
    }

    #[test]
    fn totals_are_read() {
        let result = reader(SolutionType::Real)
            .parse_str(&real_output(2, true))
            .unwrap();
        let totals = result.totals.unwrap();
        assert_eq!(totals.power, vec![1.0e5, 2.0e5, 3.0e5]);
        assert_eq!(totals.peak_power_density.len(), 3);
    }

    #[test]
    fn missing_convergence_is_an_annotation() {
        let result = reader(SolutionType::Real)
            .parse_str(&real_output(2, false))
            .unwrap();
        assert_eq!(
            result.real.as_ref().unwrap().convergence,
            Convergence::NotConverged
        );
        let err = result.ensure_converged().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotConverged);
    }

    #[test]
    fn missing_adjoint_solution() {
        let err = reader(SolutionType::RealAndAdjoint)
            .parse_str(&real_output(2, true))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::MissingSolutionType {
                solution: SolutionType::Adjoint,
                ..
            }
        ));
    }

    #[test]
    fn real_and_adjoint() {
        let labels = ["A1001A", "A1001B", "A2001A"];
        let mut text = real_output(3, true);
        text += "0  ADJOINT PROBLEM\n";
        text += "0  OUTER ITERATIONS HAVE CONVERGED\n";
        text += "0            K-EFFECTIVE =  1.00830171000\n";
        text += &flux("ADJOINT", &labels, 3);

        let result = reader(SolutionType::RealAndAdjoint).parse_str(&text).unwrap();
        assert_eq!(result.adjoint.as_ref().unwrap().keff, 1.00830171);
        assert_eq!(result.real.as_ref().unwrap().keff, 1.00830171984);
        assert_eq!(result.adjoint.unwrap().n_groups(), 3);
    }

    #[rstest]
    #[case::page_header(
        "1                              DIF3D 11.0  (ANL)  HEXAGONAL-Z NODAL\n\n\
         0   REAL REGION GROUP FLUX INTEGRALS (CONTINUED)\n"
    )]
    #[case::other_text(
        "1                              DIF3D 11.0  (ANL)  HEXAGONAL-Z NODAL\n\
         0  NODAL EDITS FOLLOW\n\n\
         0   REAL REGION GROUP FLUX INTEGRALS (CONTINUED)\n"
    )]
    #[case::marker_only("\n0   REAL REGION GROUP FLUX INTEGRALS (CONTINUED)\n")]
    fn page_eject_between_group_pages(#[case] page_break: &str) {
        let labels = ["A1001A", "A1001B", "A2001A"];
        let text = real_scalars(true) + &paged_flux("REAL", &labels, 12, page_break);

        let result = reader(SolutionType::Real).parse_str(&text).unwrap();
        let real = result.real.unwrap();
        assert!(real.group_flux.iter().all(|g| g.len() == 12));
        assert_eq!(real.group_flux[2][11], 3.00012e14);
    }

    #[test]
    fn fresh_marker_starts_a_new_table() {
        let labels = ["A1001A", "A1001B", "A2001A"];
        let mut text = real_output(12, true);
        text += &flux("REAL", &labels, 6);

        let result = reader(SolutionType::Real).parse_str(&text).unwrap();
        assert_eq!(result.real.unwrap().n_groups(), 6);
    }

    #[test]
    fn missing_adjoint_table() {
        let mut text = real_output(3, true);
        text += "0  ADJOINT PROBLEM\n";
        text += "0  OUTER ITERATIONS HAVE CONVERGED\n";
        text += "0            K-EFFECTIVE =  1.00830171000\n";

        let err = reader(SolutionType::RealAndAdjoint)
            .parse_str(&text)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingSolutionType);
        assert!(err.to_string().contains("ADJOINT REGION GROUP FLUX INTEGRALS"));
    }

    #[test]
    fn truncated_totals() {
        let text = real_output(2, true);
        let cut = text.find("REACTION INTEGRALS").unwrap();
        let err = reader(SolutionType::Real).parse_str(&text[..cut]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ParseFailure);
        assert!(err.to_string().contains("REGION TOTALS"));
    }

    #[test]
    fn truncated_flux_page() {
        let text = real_output(8, true);
        // drop the final region row of the second page
        let mut lines: Vec<&str> = text.lines().collect();
        let last_row = lines.iter().rposition(|l| l.contains("A2001A")).unwrap();
        lines.remove(last_row);
        let err = reader(SolutionType::Real)
            .parse_str(&lines.join("\n"))
            .unwrap_err();
        assert!(err.to_string().contains("REAL REGION GROUP FLUX INTEGRALS"));
    }

    #[rstest]
    #[case(vec!["A1001A", "A1001B", "A2001A"], true)]
    #[case(vec!["A1001A", "A2001A", "A1001B"], false)]
    #[case(vec!["A1001A", "A1001B"], false)]
    fn expected_region_order(#[case] expected: Vec<&str>, #[case] is_ok: bool) {
        let mut reader = reader(SolutionType::Real);
        reader.set_expected_regions(expected.iter().map(|s| s.to_string()).collect());
        assert_eq!(reader.parse_str(&real_output(2, true)).is_ok(), is_ok);
    }

    #[test]
    fn misaligned_tables() {
        let mut text = real_output(2, true);
        text = text.replacen("A2001A", "A2002A", 1);
        let err = reader(SolutionType::Real).parse_str(&text).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ParseFailure);
    }

    #[test]
    fn bad_value_is_a_parse_failure() {
        let text = real_output(2, true).replacen("2.00000E+05", "2.000X0E+05", 1);
        let err = reader(SolutionType::Real).parse_str(&text).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ParseFailure);
    }
}
