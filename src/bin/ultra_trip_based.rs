//! Trip-Based shell: stop-event preprocessing, query generation and batch
//! query evaluation for both engines.

use std::{env, error::Error};

use transit_router::algo::contraction_hierarchy::ContractionHierarchy;
use transit_router::algo::raptor::builder::ParallelConfig;
use transit_router::algo::raptor::ultra_raptor::{UltraRaptor, UltraRaptorConfig};
use transit_router::algo::trip_based::{
    compute_event_to_event_shortcuts, compute_stop_event_graph, EventShortcutSearchConfig, TripBasedQuery,
};
use transit_router::cli::{parse_arg_or, parse_num_threads, CliErr};
use transit_router::datastr::graph::{Graph, INFINITY};
use transit_router::datastr::timetable::Timetable;
use transit_router::datastr::trip_based::TripBasedData;
use transit_router::experiments::*;
use transit_router::report;
use transit_router::report::*;

const USAGE: &str = "\
usage: ultra_trip_based <command> <args...>
commands:
  raptorToTripBased <raptor dir> <trip-based base> [threads = max] [pin multiplier = 1]
      Exhaustive stop-event transfer generation (one-hop transfer graph).
  computeEventToEventShortcuts <raptor dir> <trip-based base> [witness limit = 900]
      [threads = max] [pin multiplier = 1] [require direct transfer = false]
      ULTRA event-to-event shortcut computation.
  generateUltraQueries <raptor dir> <query file> <num queries> [seed = 42]
      [min departure = 0] [max departure = 86400] [stop based = false]
  generateGeoRankQueries <raptor dir> <query file> <num sources> [seed = 42]
      [max rank = 16384] [min departure = 0] [max departure = 86400]
  runUltraQueries <input> <ch dir> <query file> <result file> <RAPTOR|Trip-Based>
      Evaluates a query file; <input> is a raptor dir for RAPTOR and a
      trip-based base for Trip-Based.";

fn main() -> Result<(), Box<dyn Error>> {
    let _reporting = enable_reporting("ultraTripBased");
    let mut args = env::args();
    args.next();

    match args.next().as_deref() {
        Some("raptorToTripBased") => raptor_to_trip_based(&mut args),
        Some("computeEventToEventShortcuts") => compute_event_shortcuts(&mut args),
        Some("generateUltraQueries") => generate_queries(&mut args),
        Some("generateGeoRankQueries") => generate_geo_queries(&mut args),
        Some("runUltraQueries") => run_queries(&mut args),
        _ => {
            eprintln!("{}", USAGE);
            Err(Box::new(CliErr("unknown command")))
        }
    }
}

fn raptor_to_trip_based(args: &mut env::Args) -> Result<(), Box<dyn Error>> {
    let input = args.next().ok_or(CliErr("no raptor directory given"))?;
    let output = args.next().ok_or(CliErr("no trip-based base given"))?;
    let num_threads = parse_num_threads(args.next())?;
    let pin_multiplier = parse_arg_or(args.next(), 1)?;

    let timetable = report_time("loading raptor data", || Timetable::deserialize(&input))?;
    let mut data = TripBasedData::new(timetable);
    report_time("stop event graph construction", || {
        compute_stop_event_graph(
            &mut data,
            ParallelConfig {
                num_threads,
                pin_multiplier,
            },
        )
    });
    report!("num_transfers", data.stop_event_graph.num_edges());
    data.serialize(&output)?;
    Ok(())
}

fn compute_event_shortcuts(args: &mut env::Args) -> Result<(), Box<dyn Error>> {
    let input = args.next().ok_or(CliErr("no raptor directory given"))?;
    let output = args.next().ok_or(CliErr("no trip-based base given"))?;
    let witness_transfer_limit = parse_arg_or(args.next(), 900)?;
    let num_threads = parse_num_threads(args.next())?;
    let pin_multiplier = parse_arg_or(args.next(), 1)?;
    let require_direct_transfer = parse_arg_or(args.next(), false)?;

    let timetable = report_time("loading raptor data", || Timetable::deserialize(&input))?;
    let mut data = TripBasedData::new(timetable);
    let shortcuts = report_time("event shortcut computation", || {
        compute_event_to_event_shortcuts(
            &mut data,
            EventShortcutSearchConfig {
                witness_transfer_limit,
                require_direct_transfer,
            },
            ParallelConfig {
                num_threads,
                pin_multiplier,
            },
            -INFINITY,
            INFINITY,
        )
    });
    report!("num_shortcuts", shortcuts.len());
    data.serialize(&output)?;
    Ok(())
}

fn generate_queries(args: &mut env::Args) -> Result<(), Box<dyn Error>> {
    let input = args.next().ok_or(CliErr("no raptor directory given"))?;
    let query_file = args.next().ok_or(CliErr("no query file given"))?;
    let num_queries = args
        .next()
        .ok_or(CliErr("no query count given"))?
        .parse()
        .map_err(|_| CliErr("could not parse query count"))?;
    let seed = parse_arg_or(args.next(), 42)?;
    let min_departure = parse_arg_or(args.next(), 0)?;
    let max_departure = parse_arg_or(args.next(), 24 * 60 * 60)?;
    let stop_based = parse_arg_or(args.next(), false)?;

    let timetable = report_time("loading raptor data", || Timetable::deserialize(&input))?;
    let queries = generate_random_queries(
        timetable.num_vertices(),
        timetable.num_stops(),
        stop_based,
        num_queries,
        (min_departure, max_departure),
        seed,
    );
    save_queries(&query_file, &queries)?;
    report!("num_queries", queries.len());
    Ok(())
}

fn generate_geo_queries(args: &mut env::Args) -> Result<(), Box<dyn Error>> {
    let input = args.next().ok_or(CliErr("no raptor directory given"))?;
    let query_file = args.next().ok_or(CliErr("no query file given"))?;
    let num_sources = args
        .next()
        .ok_or(CliErr("no source count given"))?
        .parse()
        .map_err(|_| CliErr("could not parse source count"))?;
    let seed = parse_arg_or(args.next(), 42)?;
    let max_rank = parse_arg_or(args.next(), 16384)?;
    let min_departure = parse_arg_or(args.next(), 0)?;
    let max_departure = parse_arg_or(args.next(), 24 * 60 * 60)?;

    let timetable = report_time("loading raptor data", || Timetable::deserialize(&input))?;
    let queries = generate_geo_rank_queries(&timetable.coordinates, num_sources, max_rank, (min_departure, max_departure), seed);
    save_queries(&query_file, &queries)?;
    report!("num_queries", queries.len());
    Ok(())
}

fn run_queries(args: &mut env::Args) -> Result<(), Box<dyn Error>> {
    let input = args.next().ok_or(CliErr("no network input given"))?;
    let ch_dir = args.next().ok_or(CliErr("no ch directory given"))?;
    let query_file = args.next().ok_or(CliErr("no query file given"))?;
    let result_file = args.next().ok_or(CliErr("no result file given"))?;
    let query_type = args.next().ok_or(CliErr("no query type given"))?;

    let ch = report_time("loading ch", || ContractionHierarchy::deserialize(&ch_dir))?;
    let mut queries = load_queries(&query_file)?;
    report!("num_queries", queries.len());

    match query_type.as_str() {
        "RAPTOR" => {
            let timetable = report_time("loading raptor data", || Timetable::deserialize(&input))?;
            let mut server = UltraRaptor::new(&timetable, &ch, UltraRaptorConfig::default());
            report_time("running queries", || run_ultra_raptor_queries(&mut server, &mut queries));
        }
        "Trip-Based" => {
            let data = report_time("loading trip-based data", || TripBasedData::deserialize(&input))?;
            let mut server = TripBasedQuery::new(&data, &ch);
            report_time("running queries", || run_trip_based_queries(&mut server, &mut queries));
        }
        _ => return Err(Box::new(CliErr("unknown query type"))),
    }

    save_queries(&result_file, &queries)?;
    Ok(())
}
