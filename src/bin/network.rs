//! Preprocessing shell: contraction hierarchies and ULTRA stop-to-stop
//! shortcuts. Each command is stateful only in the files it produces.

use std::{env, error::Error};

use transit_router::algo::contraction_hierarchy::{contract_graph, contract_to_core};
use transit_router::algo::raptor::builder::{compute_stop_to_stop_shortcuts, ParallelConfig};
use transit_router::algo::raptor::ShortcutSearchConfig;
use transit_router::cli::{parse_arg_or, parse_num_threads, CliErr};
use transit_router::datastr::graph::{Graph, INFINITY};
use transit_router::datastr::timetable::Timetable;
use transit_router::report;
use transit_router::report::*;

const USAGE: &str = "\
usage: network <command> <args...>
commands:
  buildCH <raptor dir> <ch dir>
      Builds the query CH over the full transfer graph.
  coreCH <raptor dir> <core raptor dir> <ch dir> [max core degree = 14]
      Contracts all non-stop vertices and replaces the transfer graph by the core.
  computeStopToStopShortcuts <raptor dir> <output raptor dir> [witness limit = 900]
      [threads = max] [pin multiplier = 1] [prune with existing shortcuts = true]
      [require direct transfer = false]
      Computes ULTRA shortcuts and installs them as the transfer graph.";

fn main() -> Result<(), Box<dyn Error>> {
    let _reporting = enable_reporting("network");
    let mut args = env::args();
    args.next();

    match args.next().as_deref() {
        Some("buildCH") => build_ch(&mut args),
        Some("coreCH") => core_ch(&mut args),
        Some("computeStopToStopShortcuts") => compute_shortcuts(&mut args),
        _ => {
            eprintln!("{}", USAGE);
            Err(Box::new(CliErr("unknown command")))
        }
    }
}

fn build_ch(args: &mut env::Args) -> Result<(), Box<dyn Error>> {
    let input = args.next().ok_or(CliErr("no raptor directory given"))?;
    let output = args.next().ok_or(CliErr("no ch directory given"))?;

    let timetable = report_time("loading raptor data", || Timetable::deserialize(&input))?;
    report!("num_vertices", timetable.num_vertices());
    report!("num_edges", timetable.transfer_graph.num_edges());

    let ch = report_time("ch construction", || contract_graph(&timetable.transfer_graph));
    report!("ch_forward_edges", ch.forward.num_edges());
    report!("ch_backward_edges", ch.backward.num_edges());
    ch.serialize(&output)?;
    Ok(())
}

fn core_ch(args: &mut env::Args) -> Result<(), Box<dyn Error>> {
    let input = args.next().ok_or(CliErr("no raptor directory given"))?;
    let core_output = args.next().ok_or(CliErr("no core raptor directory given"))?;
    let ch_output = args.next().ok_or(CliErr("no ch directory given"))?;
    let max_core_degree: f64 = parse_arg_or(args.next(), 14.0)?;

    let timetable = report_time("loading raptor data", || Timetable::deserialize(&input))?;
    let num_stops = timetable.num_stops();
    let (ch, core) = report_time("core ch construction", || {
        contract_to_core(&timetable.transfer_graph, num_stops, max_core_degree)
    });
    report!("core_vertices", num_stops);
    report!("core_edges", core.num_edges());

    ch.serialize(&ch_output)?;
    timetable.with_transfer_graph(core).serialize(&core_output)?;
    Ok(())
}

fn compute_shortcuts(args: &mut env::Args) -> Result<(), Box<dyn Error>> {
    let input = args.next().ok_or(CliErr("no raptor directory given"))?;
    let output = args.next().ok_or(CliErr("no output raptor directory given"))?;
    let witness_transfer_limit = parse_arg_or(args.next(), 900)?;
    let num_threads = parse_num_threads(args.next())?;
    let pin_multiplier = parse_arg_or(args.next(), 1)?;
    let prune_with_existing_shortcuts = parse_arg_or(args.next(), true)?;
    let require_direct_transfer = parse_arg_or(args.next(), false)?;

    let timetable = report_time("loading raptor data", || Timetable::deserialize(&input))?;
    let search_config = ShortcutSearchConfig {
        witness_transfer_limit,
        prune_with_existing_shortcuts,
        require_direct_transfer,
    };
    let parallel = ParallelConfig {
        num_threads,
        pin_multiplier,
    };

    let (shortcuts, shortcut_graph) = report_time("shortcut computation", || {
        compute_stop_to_stop_shortcuts(&timetable, search_config, parallel, -INFINITY, INFINITY)
    });
    report!("num_shortcuts", shortcuts.len());

    timetable.with_transfer_graph(shortcut_graph).serialize(&output)?;
    Ok(())
}
