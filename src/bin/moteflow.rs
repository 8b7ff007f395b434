use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use colored::*;
use moteflow::codec::{self, TelemetryReading};
use moteflow::feed::{FeedGenerator, FeedVariant, Trajectory};
use moteflow::frame::RadioFrame;
use moteflow::socket::{EndpointRef, InboundFrame, TelemetrySocket};

const DEFAULT_ENDPOINT: &str = "02-00-00-00-00-00-00-01";
const NANOS_PER_SEC: u64 = 1_000_000_000;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let matches = App::new("moteflow")
        .version("0.1.0")
        .author("Sensor Network Engineering Team")
        .about("📡 Telemetry socket and sensor feed tooling for simulated motes")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("format")
                .short("f")
                .long("format")
                .value_name("FORMAT")
                .help("Output format")
                .takes_value(true)
                .possible_values(&["json", "table"])
                .default_value("table")
                .global(true),
        )
        .subcommand(
            SubCommand::with_name("send")
                .about("🔗 Evaluate a socket-send command and print the message to transmit")
                .arg(Arg::with_name("port").help("Destination port").required(true))
                .arg(Arg::with_name("endpoint").help("Destination mote (EUI-64)").required(true))
                .arg(
                    Arg::with_name("args")
                        .help("Command arguments, e.g. 'attach'")
                        .multiple(true),
                ),
        )
        .subcommand(
            SubCommand::with_name("decode")
                .about("📥 Render an inbound payload the way the socket logs it")
                .arg(Arg::with_name("payload").help("Payload as hex").required(true))
                .arg(
                    Arg::with_name("endpoint")
                        .long("endpoint")
                        .takes_value(true)
                        .default_value(DEFAULT_ENDPOINT),
                )
                .arg(
                    Arg::with_name("port")
                        .long("port")
                        .takes_value(true)
                        .default_value("1"),
                ),
        )
        .subcommand(
            SubCommand::with_name("feed")
                .about("🌡️  Request trajectories from a feed generator")
                .arg(
                    Arg::with_name("variant")
                        .long("variant")
                        .takes_value(true)
                        .possible_values(&["one", "two"])
                        .default_value("one"),
                )
                .arg(
                    Arg::with_name("count")
                        .short("n")
                        .long("count")
                        .takes_value(true)
                        .default_value("3"),
                )
                .arg(Arg::with_name("random").long("random").help("Emit single random samples"))
                .arg(Arg::with_name("seed").long("seed").takes_value(true)),
        )
        .subcommand(
            SubCommand::with_name("frame")
                .about("📦 Encode a reading into a node-to-gateway radio frame")
                .arg(Arg::with_name("short-addr").help("Source short address (hex)").required(true))
                .arg(Arg::with_name("temperature").required(true))
                .arg(Arg::with_name("humidity").required(true))
                .arg(
                    Arg::with_name("seq")
                        .long("seq")
                        .takes_value(true)
                        .default_value("0"),
                ),
        )
        .get_matches();

    let format = matches.value_of("format").unwrap_or("table");

    match matches.subcommand() {
        ("send", Some(sub_matches)) => handle_send(sub_matches, format)?,
        ("decode", Some(sub_matches)) => handle_decode(sub_matches, format)?,
        ("feed", Some(sub_matches)) => handle_feed(sub_matches, format)?,
        ("frame", Some(sub_matches)) => handle_frame(sub_matches, format)?,
        _ => {
            println!("{}", "No command specified. Use --help for usage information.".yellow());
        }
    }

    Ok(())
}

fn handle_send(matches: &ArgMatches<'_>, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let port: u16 = matches.value_of("port").unwrap_or_default().parse()?;
    let endpoint: EndpointRef = matches.value_of("endpoint").unwrap_or_default().parse()?;
    let args: Vec<&str> = matches
        .values_of("args")
        .map(|values| values.collect())
        .unwrap_or_default();

    let mut socket = TelemetrySocket::new();
    match socket.send(port, endpoint, args.as_slice()) {
        Ok(message) => match format {
            "json" => println!(
                "{}",
                serde_json::json!({
                    "to": endpoint,
                    "port": port,
                    "message": codec::to_hex(&message)
                })
            ),
            _ => println!(
                "{} {} {}",
                "✅".green(),
                format!("{endpoint}:{port}").bright_cyan(),
                codec::to_hex(&message).bright_white()
            ),
        },
        Err(e) => {
            println!("{} {}", "❌".red(), e.to_string().bright_red());
            return Err(e.into());
        }
    }
    Ok(())
}

fn handle_decode(matches: &ArgMatches<'_>, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let payload = codec::from_hex(matches.value_of("payload").unwrap_or_default())
        .ok_or("payload is not valid hex")?;
    let endpoint: EndpointRef = matches.value_of("endpoint").unwrap_or(DEFAULT_ENDPOINT).parse()?;
    let port: u16 = matches.value_of("port").unwrap_or("1").parse()?;

    let frame = InboundFrame::new(endpoint, port, payload);
    let line = TelemetrySocket::new().on_data(&frame);

    match format {
        "json" => println!("{}", serde_json::json!({ "frame": frame, "line": line })),
        _ => {
            if TelemetryReading::decode(&frame.payload).is_some() {
                println!("{}", line.bright_green());
            } else {
                println!("{}", line.yellow());
            }
        }
    }
    Ok(())
}

fn handle_feed(matches: &ArgMatches<'_>, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let variant: FeedVariant = matches.value_of("variant").unwrap_or("one").parse()?;
    let count: usize = matches.value_of("count").unwrap_or("3").parse()?;
    let random = matches.is_present("random");

    let mut generator = match matches.value_of("seed") {
        Some(seed) => FeedGenerator::with_seed(variant, seed.parse()?),
        None => FeedGenerator::new(variant),
    };
    let node: EndpointRef = DEFAULT_ENDPOINT.parse()?;

    for i in 0..count {
        let nanos = i as u64 * NANOS_PER_SEC;
        let trajectory = if random {
            generator.next_random_sample(node, "humid-temp", nanos)
        } else {
            generator.next_trajectory(node, "humid-temp", nanos)
        };
        print_trajectory(i, &trajectory, format)?;
    }
    Ok(())
}

fn handle_frame(matches: &ArgMatches<'_>, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let short_addr = u16::from_str_radix(
        matches
            .value_of("short-addr")
            .unwrap_or_default()
            .trim_start_matches("0x"),
        16,
    )?;
    let temperature: u16 = matches.value_of("temperature").unwrap_or_default().parse()?;
    let humidity: u16 = matches.value_of("humidity").unwrap_or_default().parse()?;
    let seq: u8 = matches.value_of("seq").unwrap_or("0").parse()?;

    let mut radio = RadioFrame::new(short_addr).with_sequence(seq);
    let bytes = radio.encode_reading(TelemetryReading::new(temperature, humidity));

    match format {
        "json" => println!("{}", serde_json::to_string(&RadioFrame::decode(&bytes)?)?),
        _ => println!("{} 0x{}", "Sent data:".bright_white(), codec::to_hex(&bytes).bright_cyan()),
    }
    Ok(())
}

fn print_trajectory(
    index: usize,
    trajectory: &Trajectory,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        "json" => println!("{}", serde_json::to_string(trajectory)?),
        _ => {
            println!(
                "{} {}",
                format!("#{index}").bright_blue().bold(),
                format!("{:?}", trajectory.kind).bright_white()
            );
            for keyframe in &trajectory.keyframes {
                println!(
                    "  {:>6} ms  {}",
                    keyframe.timestamp_ms,
                    keyframe.reading.to_string().bright_green()
                );
            }
        }
    }
    Ok(())
}
