use std::error::Error;

use colored::*;
use csv::Writer;
use dotenv::dotenv;
use reqwest::Client;
use tracing::{info, span, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::RunConfig;
use crate::database::RunStore;
use crate::distance::road_routing::{route_coordinates, route_geometry};
use crate::domain::ProblemInstance;
use crate::engine::{optimize, AlgorithmKey, ComparisonReport, OptimizationOutcome, OptimizationResult};
use crate::setup::load_request;

/// Initialize tracing and environment
pub fn init_tracing_and_env() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(
            fmt::layer()
                .with_span_events(fmt::format::FmtSpan::NEW | fmt::format::FmtSpan::CLOSE)
                .pretty(),
        )
        .init();

    dotenv().ok();
    Ok(())
}

pub async fn run() -> Result<(), Box<dyn Error>> {
    init_tracing_and_env()?;
    let config = RunConfig::from_env();
    let algorithm: AlgorithmKey = config.algorithm.parse()?;
    let params = config.search_params();

    let request = {
        let span = span!(Level::INFO, "setup");
        let _guard = span.enter();
        load_request(&config)?
    };

    info!(
        "Starting CVRP solver: {} with {} locations (compare all: {}, seed {})",
        algorithm,
        request.locations.len() - 1,
        config.compare_all,
        params.seed
    );

    let outcome = {
        let request = request.clone();
        let compare_all = config.compare_all;
        tokio::task::spawn_blocking(move || {
            optimize(
                &request.vehicles,
                &request.locations,
                &request.depot,
                algorithm,
                compare_all,
                &params,
                None,
            )
        })
        .await??
    };

    if let OptimizationOutcome::Comparison(report) = &outcome {
        print_comparison(report);
    }
    let Some(best) = outcome.best() else {
        return Err("every algorithm failed".into());
    };

    let pi = ProblemInstance::new(&request.vehicles, &request.locations, &request.depot)?;
    print_solution(best, &pi);

    save_to_csv(&best.stats.best_so_far_updates, best.algorithm, &config.report_csv)?;

    let store = RunStore::connect(&config.database_url).await?;
    let run_id = store.save_run(best).await?;
    info!("Saved run {}", run_id);

    if config.road_geometry {
        print_road_geometry(best, &pi, &config.osrm_base_url).await;
    }

    Ok(())
}

fn save_to_csv(
    best_so_far_updates: &[(usize, f64)],
    algorithm: AlgorithmKey,
    filename: &str,
) -> Result<(), Box<dyn Error>> {
    let mut wtr = Writer::from_path(filename)?;

    wtr.write_record(["iteration", "new_best_so_far", "algorithm"])?;

    for (iteration, value) in best_so_far_updates {
        wtr.write_record([iteration.to_string(), value.to_string(), algorithm.to_string()])?;
    }

    wtr.flush()?;
    Ok(())
}

fn print_solution(result: &OptimizationResult, pi: &ProblemInstance) {
    let summary = &result.summary;
    let headline = format!(
        "{}: {:.2} km, {} min, {}/{} locations ({:.1}%), utilization {:.1}%",
        result.algorithm,
        summary.total_distance,
        summary.total_duration,
        summary.locations_served,
        summary.total_locations,
        summary.coverage_percentage,
        summary.vehicle_utilization
    );
    if summary.unserved_routes > 0 {
        println!("{}", headline.red());
    } else {
        println!("{}", headline.green());
    }

    for (ind, route) in result.solution.routes.iter().enumerate() {
        let ids: Vec<String> = route
            .stops()
            .iter()
            .map(|s| pi.locations[s.location].id.to_string())
            .collect();
        let line = match route.vehicle() {
            Some(vehicle) => format!(
                "#{} {} {} / {} : {:.2} km : {}",
                ind + 1,
                vehicle.name,
                route.total_capacity(),
                vehicle.capacity,
                route.distance(),
                ids.join(" -> ")
            ),
            None => format!(
                "#{} unserved {} : {:.2} km : {}",
                ind + 1,
                route.total_capacity(),
                route.distance(),
                ids.join(" -> ")
            ),
        };
        if route.capacity_exceeded() {
            println!("{}", line.red());
        } else {
            println!("{}", line);
        }
    }
}

fn print_comparison(report: &ComparisonReport) {
    println!("{}", "Algorithm comparison".bold());
    for (place, &ind) in report.ranking.iter().enumerate() {
        let result = &report.results[ind];
        println!(
            "{:>2}. {:<24} {:>6.1}% {:>10.2} km",
            place + 1,
            result.algorithm.as_str(),
            result.summary.coverage_percentage,
            result.summary.total_distance
        );
    }
    for result in report.results.iter().filter(|r| !r.succeeded()) {
        let reason = result.error.as_deref().unwrap_or("unknown error");
        println!("    {:<24} {}", result.algorithm.as_str(), reason.red());
    }
}

async fn print_road_geometry(result: &OptimizationResult, pi: &ProblemInstance, base_url: &str) {
    let client = Client::new();
    for (ind, route) in result.solution.routes.iter().enumerate() {
        if route.capacity_exceeded() {
            continue;
        }
        let coords = route_coordinates(route, pi);
        let geometry = route_geometry(&client, base_url, &coords).await;
        println!(
            "#{} road geometry ({:?}): {:.2} km, {} min, {} points",
            ind + 1,
            geometry.source,
            geometry.distance_km,
            geometry.duration_min,
            geometry.coordinates.len()
        );
    }
}
