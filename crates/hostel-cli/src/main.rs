use std::env;
use std::net::SocketAddr;

use contracts::{NewHostelRequest, NewRoomRequest};
use hostel_api::{serve, ResidencyApi, ServiceConfig};
use tracing_subscriber::{fmt, EnvFilter};

fn print_usage() {
    println!("hostel-cli <command>");
    println!("commands:");
    println!("  serve [addr] [sqlite_path]");
    println!("    default addr: 127.0.0.1:8080 (port via HOSTEL_API_PORT)");
    println!("  seed [sqlite_path]");
    println!("    creates a demo hostel with three rooms in the sqlite store");
}

fn parse_socket_addr(value: Option<&String>, default_port: u16) -> Result<SocketAddr, String> {
    match value {
        Some(raw) => raw
            .parse::<SocketAddr>()
            .map_err(|_| format!("invalid addr: {raw}")),
        None => Ok(SocketAddr::from(([127, 0, 0, 1], default_port))),
    }
}

fn parse_sqlite_path(value: Option<&String>, config: &ServiceConfig) -> String {
    value
        .map(String::to_string)
        .filter(|path| !path.trim().is_empty())
        .unwrap_or_else(|| config.sqlite_path.clone())
}

fn run_seed(args: &[String], config: &ServiceConfig) -> Result<(), String> {
    let sqlite_path = parse_sqlite_path(args.get(2), config);

    let mut api = ResidencyApi::new();
    api.attach_sqlite_store(&sqlite_path)
        .map_err(|err| format!("failed to attach sqlite store: {err}"))?;

    let hostel = api
        .create_hostel(&NewHostelRequest {
            name: "Lakeview Residency".to_string(),
            location: Some("Indore".to_string()),
        })
        .map_err(|err| format!("failed to create hostel: {err}"))?;

    let rooms = [("101", 6000, 3), ("102", 6500, 2), ("201", 7000, 2)];
    for (room_number, price, capacity) in rooms {
        api.create_room(
            &hostel.hostel_id,
            &NewRoomRequest {
                room_number: room_number.to_string(),
                price,
                capacity,
            },
        )
        .map_err(|err| format!("failed to create room {room_number}: {err}"))?;
    }

    if let Some(error) = api.last_persistence_error() {
        return Err(format!("persistence error after seeding: {error}"));
    }

    println!(
        "seeded hostel_id={} rooms={} sqlite={}",
        hostel.hostel_id,
        rooms.len(),
        sqlite_path
    );
    Ok(())
}

#[tokio::main]
async fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let args: Vec<String> = env::args().collect();
    let command = args.get(1).map(String::as_str);
    let config = ServiceConfig::load();

    match command {
        Some("serve") => match parse_socket_addr(args.get(2), config.port) {
            Ok(addr) => {
                let sqlite_path = parse_sqlite_path(args.get(3), &config);
                println!("serving residency api on http://{addr}");
                if let Err(err) = serve(addr, Some(sqlite_path)).await {
                    eprintln!("server error: {err}");
                    std::process::exit(1);
                }
            }
            Err(err) => {
                eprintln!("error: {err}");
                print_usage();
                std::process::exit(2);
            }
        },
        Some("seed") => {
            if let Err(err) = run_seed(&args, &config) {
                eprintln!("error: {err}");
                print_usage();
                std::process::exit(2);
            }
        }
        _ => {
            print_usage();
        }
    }
}
