use crate::infra::{parse_level, query_layer, run_blocking};
use clap::Args;
use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;
use vacancy_atlas::atlas::report::views::RegionRow;
use vacancy_atlas::atlas::report::write_table_csv;
use vacancy_atlas::atlas::{
    GeographyLevel, HierarchyNavigator, LayerSnapshot, PlaceOption, DEFAULT_TOP_REGIONS,
};
use vacancy_atlas::config::AppConfig;
use vacancy_atlas::error::AppError;
use vacancy_atlas::sources::{CensusDataSource, DataSource};

#[derive(Args, Debug)]
pub(crate) struct ReportArgs {
    /// Geography level: state, county, tract or block_group
    #[arg(long, value_parser = parse_level, default_value = "state")]
    pub(crate) level: GeographyLevel,
    /// State FIPS code (required below the state level)
    #[arg(long)]
    pub(crate) state: Option<String>,
    /// County FIPS code within the state (required for tracts and block groups)
    #[arg(long)]
    pub(crate) county: Option<String>,
    /// Number of highest-rate regions to list
    #[arg(long, default_value_t = DEFAULT_TOP_REGIONS)]
    pub(crate) top: usize,
    /// Also write the full data table to this CSV file
    #[arg(long)]
    pub(crate) csv: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct PlacesArgs {
    /// List the counties of this state instead of the states
    #[arg(long)]
    pub(crate) state: Option<String>,
}

pub(crate) async fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let ReportArgs {
        level,
        state,
        county,
        top,
        csv,
    } = args;

    let navigator = HierarchyNavigator::at(level, state.as_deref(), county.as_deref())?;
    let source = census_source()?;
    let snapshot = query_layer(source, navigator).await?;

    render_report(&snapshot, top);

    if let Some(path) = csv {
        let file = File::create(&path)?;
        write_table_csv(file, snapshot.summary.table())?;
        println!("\nFull table written to {}", path.display());
    }

    Ok(())
}

pub(crate) async fn run_places(args: PlacesArgs) -> Result<(), AppError> {
    let source = census_source()?;
    let state = args.state;
    let places = run_blocking(move || match state {
        Some(state) => Ok(source.fetch_county_list(&state)?),
        None => Ok(source.fetch_state_list()?),
    })
    .await?;

    render_places(&places);
    Ok(())
}

fn census_source() -> Result<Arc<dyn DataSource>, AppError> {
    let config = AppConfig::load()?;
    Ok(Arc::new(CensusDataSource::new(config.census)))
}

pub(crate) fn render_report(snapshot: &LayerSnapshot, top: usize) {
    let summary = &snapshot.summary;
    let view = summary.view(top);

    println!("Housing vacancy: {}", snapshot.scope.level.label());
    println!("Scope: {}", snapshot.scope);
    println!("Fetched: {}", snapshot.fetched_at.format("%Y-%m-%d %H:%M:%S UTC"));
    println!(
        "\nAverage vacancy rate {:.1}% | Vacant units {} | Regions {}",
        view.avg_vacancy_rate_pct, view.total_vacant_units, view.region_count
    );

    if view.top.is_empty() {
        println!("\nTop regions: none");
    } else {
        println!("\nTop {} regions", view.top.len());
        for (rank, row) in view.top.iter().enumerate() {
            println!("{:>3}. {}", rank + 1, format_row(row));
        }
    }

    println!("\nFull table");
    for region in summary.table() {
        println!("- {}", format_row(&RegionRow::from_region(region)));
    }
}

fn format_row(row: &RegionRow) -> String {
    format!(
        "{} ({}): {} of {} units vacant, {} [{}]",
        row.name, row.geo_id, row.vacant_units, row.total_units, row.vacancy_rate, row.color
    )
}

fn render_places(places: &[PlaceOption]) {
    if places.is_empty() {
        println!("No places returned");
        return;
    }
    for place in places {
        println!("{}  {}", place.id, place.name);
    }
}
