//! Areas command implementation

use crate::cli::output::{format_areas_json, format_areas_table, AreaView};
use crate::cli::AreasArgs;
use crate::data::Area;

/// Handle `covidash areas` command
///
/// Lists the areas in selector order: regions alphabetically, then "Italia".
pub fn handle_areas(args: &AreasArgs) -> Result<String, Box<dyn std::error::Error>> {
    let areas = Area::options()
        .into_iter()
        .map(Area::parse)
        .map(|area| area.map(AreaView::from))
        .collect::<Result<Vec<_>, _>>()?;

    if args.json {
        Ok(format_areas_json(&areas)?)
    } else {
        Ok(format_areas_table(&areas))
    }
}
