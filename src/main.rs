use std::env;
use std::process::ExitCode;
use std::sync::Arc;
use std::thread;

use chrono::Local;
use log::{error, info};

mod config;
mod scheduler;
mod server;
mod simulate;
mod state;
mod thingspeak;
mod views;

use config::Config;
use thingspeak::{convert_feed, convert_field, Gateway};

fn usage(program: &str) {
    eprintln!("Usage: {program} [SUBCOMMAND] [OPTIONS]");
    eprintln!("Subcommands:");
    eprintln!("    serve [address]                    start the dashboard daemon");
    eprintln!("    show <status|charts|table|json>    fetch the feed and print one rendered view");
    eprintln!("    show field <1-5>                   fetch and print one field's history");
    eprintln!("    send [--random | CO2 NOISE LUX HPA KMH]");
    eprintln!("                                       submit a reading, then read it back");
    eprintln!("Config: envirodash.toml in the working directory, or $ENVIRODASH_CONFIG");
}

fn build_gateway(config: &Config) -> Result<Gateway, ()> {
    Gateway::new(config).map_err(|err| {
        error!("could not build HTTP client: {err}");
    })
}

/// One-shot snapshot for the `show` subcommand: fetch now, render from that.
fn fetch_snapshot(gateway: &Gateway, results: usize) -> Result<state::Snapshot, ()> {
    let readings = gateway.fetch_feed(results).map(convert_feed).map_err(|err| {
        error!("feed query failed: {err}");
    })?;
    Ok(state::Snapshot {
        readings,
        loading: false,
        last_updated: Some(Local::now()),
        last_error: None,
    })
}

fn run_show(config: &Config, target: &str, mut args: env::Args) -> Result<(), ()> {
    let gateway = build_gateway(config)?;

    let rendered = if target == "field" {
        let field_index = args.next().and_then(|raw| raw.parse::<u8>().ok()).ok_or_else(|| {
            error!("'show field' requires an index between 1 and 5");
        })?;
        let samples = gateway
            .fetch_field(field_index, config.results)
            .map(convert_field)
            .map_err(|err| {
                error!("field query failed: {err}");
            })?;
        views::render_field(field_index, &samples)
    } else {
        let snapshot = fetch_snapshot(&gateway, config.results)?;
        match target {
            "status" => views::render_status(&snapshot),
            "charts" => views::render_charts(&snapshot),
            "table" => views::render_table(&snapshot),
            "json" => views::render_json(&snapshot).map_err(Into::into),
            _ => unreachable!("subcommand handler validates the view name"),
        }
    };

    let payload = rendered.map_err(|err| {
        error!("render failed: {err}");
    })?;
    println!("{payload}");
    Ok(())
}

fn run_send(config: &Config, args: Vec<String>) -> Result<(), ()> {
    let reading = match args.as_slice() {
        [] => simulate::default_reading(),
        [flag] if flag == "--random" => simulate::random_reading(),
        [co2, noise, luminosity, pressure, wind_speed] => {
            let mut values = [0f64; 5];
            for (slot, raw) in [co2, noise, luminosity, pressure, wind_speed].iter().enumerate() {
                values[slot] = raw.parse().map_err(|_| {
                    error!("'{raw}' is not a number");
                })?;
            }
            simulate::reading_from_values(values)
        }
        _ => {
            error!("'send' takes no arguments, --random, or all five values");
            return Err(());
        }
    };

    let gateway = build_gateway(config)?;
    info!(
        "submitting co2={co2} noise={noise} luminosity={lux} pressure={hpa} wind={wind}",
        co2 = reading.co2,
        noise = reading.noise,
        lux = reading.luminosity,
        hpa = reading.pressure,
        wind = reading.wind_speed,
    );

    let outcome = gateway.send_reading(&reading).map_err(|err| {
        error!("could not reach the telemetry service: {err}");
    })?;
    if !outcome.ok {
        error!("write rejected: {} {}", outcome.status, outcome.status_text);
        return Err(());
    }
    println!("accepted ({} {})", outcome.status, outcome.status_text);

    // The service needs a moment before the write shows up in reads.
    thread::sleep(scheduler::write_settle_delay());
    let snapshot = fetch_snapshot(&gateway, config.results)?;
    match snapshot.readings.last() {
        Some(latest) => {
            let json = serde_json::to_string_pretty(latest).map_err(|err| {
                error!("could not format the reading: {err}");
            })?;
            println!("newest reading after submit:\n{json}");
        }
        None => info!("feed still empty after submit"),
    }
    Ok(())
}

fn run_serve(config: Config, address: Option<String>) -> Result<(), ()> {
    let gateway = Arc::new(build_gateway(&config)?);
    let dashboard = state::shared();

    scheduler::RefreshJob::new(
        std::time::Duration::from_secs(config.refresh_interval_secs),
        gateway.clone(),
        dashboard.clone(),
        config.results,
    )
    .run();

    let address = address.unwrap_or_else(|| config.listen_address.clone());
    let context = server::Context {
        gateway,
        state: dashboard,
        results: config.results,
    };
    server::start(&address, context)
}

fn entry() -> Result<(), ()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = env::args();
    let program = args.next().expect("path to program is provided");

    let subcommand = args.next().ok_or_else(|| {
        usage(&program);
        eprintln!("ERROR: no subcommand is provided");
    })?;

    let config = Config::load().map_err(|err| {
        error!("config error: {err}");
    })?;

    match subcommand.as_str() {
        "serve" => run_serve(config, args.next()),

        "show" => {
            let target = args.next().ok_or_else(|| {
                usage(&program);
                eprintln!("ERROR: 'show' requires a view: status, charts, table, json, or field");
            })?;
            match target.as_str() {
                "status" | "charts" | "table" | "json" | "field" => {
                    run_show(&config, &target, args)
                }
                _ => {
                    usage(&program);
                    eprintln!("ERROR: unknown view '{target}'");
                    Err(())
                }
            }
        }

        "send" => run_send(&config, args.collect()),

        _ => {
            usage(&program);
            eprintln!("ERROR: unknown subcommand {subcommand}");
            Err(())
        }
    }
}

fn main() -> ExitCode {
    match entry() {
        Ok(()) => ExitCode::SUCCESS,
        Err(()) => ExitCode::FAILURE,
    }
}
