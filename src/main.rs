//! xda - inspect relay channel messages from the command line.

use std::env;
use std::process::ExitCode;
use std::sync::Arc;

use tracing::{debug, error};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use xda_transport::audit::AuditLogger;
use xda_transport::config::Settings;
use xda_transport::transport::{ChannelId, MemoryEmbedder, Transport};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const NAME: &str = env!("CARGO_PKG_NAME");

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return ExitCode::SUCCESS;
    }

    if args.iter().any(|a| a == "--version" || a == "-V") {
        println!("{} {}", NAME, VERSION);
        return ExitCode::SUCCESS;
    }

    let settings = match option_value(&args, "--config", "-c") {
        Some(path) => match Settings::load(&path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Error loading configuration: {}", e);
                return ExitCode::FAILURE;
            }
        },
        None => Settings::default(),
    };

    if let Err(e) = init_logging(&settings) {
        eprintln!("Error initializing logging: {}", e);
        return ExitCode::FAILURE;
    }

    let Some(command) = args.get(1).filter(|a| !a.starts_with('-')) else {
        print_help();
        return ExitCode::FAILURE;
    };

    match run(command, &args, settings) {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, command = %command, "Command failed");
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Run one command and return what to print.
fn run(command: &str, args: &[String], settings: Settings) -> Result<String, Box<dyn std::error::Error>> {
    let client_uri = option_value(args, "--client", "")
        .unwrap_or_else(|| settings.relay.client_uri.clone());
    let server_uri = option_value(args, "--server", "")
        .unwrap_or_else(|| settings.relay.server_uri.clone());

    let mut transport = Transport::from_config(MemoryEmbedder::new(), &settings.channel);
    if settings.audit.enabled {
        let logger = AuditLogger::new(&settings.audit.log_path)?;
        transport = transport.with_audit_logger(Arc::new(logger));
    }

    let id = transport.initialize(&client_uri, &server_uri)?;
    debug!(channel_id = %id, "Channel opened for command");

    match command {
        "init" => {
            let frame = transport
                .embedder()
                .frame(id)
                .ok_or("relay frame was not embedded")?;
            Ok(format!("{}\n{}", frame.element_id, frame.src))
        }
        "request" => {
            build_request(&mut transport, id, args)?;
            transport.send(id)?;
            let message = transport
                .embedder()
                .last_dispatch(id)
                .ok_or("request was not dispatched")?;
            Ok(message.to_string())
        }
        "response" => {
            let message = option_value(args, "--message", "-m").ok_or("missing --message")?;
            transport.send(id)?;
            let state = transport.receive(id, &message)?;
            Ok(serde_json::to_string_pretty(&state)?)
        }
        other => Err(format!("unknown command '{}'", other).into()),
    }
}

/// Fill in the channel's request from `--uri`, `--method`, `--header` and `--data`.
fn build_request(
    transport: &mut Transport<MemoryEmbedder>,
    id: ChannelId,
    args: &[String],
) -> Result<(), Box<dyn std::error::Error>> {
    let state = transport.state_mut(id)?;
    state.api_uri = option_value(args, "--uri", "-u").ok_or("missing --uri")?;
    if let Some(method) = option_value(args, "--method", "-X") {
        state.method = Some(method);
    }
    state.data = option_value(args, "--data", "-d");

    for header in option_values(args, "--header", "-H") {
        let (name, value) = header
            .split_once(':')
            .ok_or_else(|| format!("invalid header '{}', expected 'Name: Value'", header))?;
        state.set_request_header(name.trim(), value.trim());
    }

    Ok(())
}

/// Print help message.
fn print_help() {
    println!(
        r#"{} {}
Build and inspect messages exchanged with an xda relay document.

USAGE:
    {} <COMMAND> [OPTIONS]

COMMANDS:
    init                   Print the relay frame id and initialization URI
    request                Print the encoded request message
    response               Apply an encoded response and print the exchange

OPTIONS:
    -c, --config <PATH>    Path to configuration file
        --client <URI>     Relay document URI [default: from config]
        --server <URI>     Server origin [default: from config]
    -u, --uri <URI>        Request target (request)
    -X, --method <METHOD>  Request method (request) [default: POST]
    -H, --header <HEADER>  Request header 'Name: Value', repeatable (request)
    -d, --data <BODY>      Request body (request)
    -m, --message <WIRE>   Encoded relay response (response)
    -h, --help             Print help information
    -V, --version          Print version information
"#,
        NAME, VERSION, NAME
    );
}

/// All values given for an option, as `--name VALUE` or `--name=VALUE`.
fn option_values(args: &[String], long: &str, short: &str) -> Vec<String> {
    let prefix = format!("{}=", long);
    let mut values = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == long || (!short.is_empty() && arg == short) {
            if let Some(value) = iter.next() {
                values.push(value.clone());
            }
        } else if let Some(value) = arg.strip_prefix(&prefix) {
            values.push(value.to_string());
        }
    }
    values
}

/// The last value given for an option.
fn option_value(args: &[String], long: &str, short: &str) -> Option<String> {
    option_values(args, long, short).pop()
}

/// Initialize logging based on settings.
fn init_logging(settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.logging.level));

    // stdout carries command output
    match settings.logging.format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .try_init()?;
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .try_init()?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|a| a.to_string()).collect()
    }

    #[test]
    fn test_option_values_repeated_short_and_long() {
        let args = args(&[
            "xda",
            "request",
            "-H",
            "X-Token: abc",
            "--header",
            "Accept: */*",
            "--header=X-Trace: 1",
        ]);
        assert_eq!(
            option_values(&args, "--header", "-H"),
            vec!["X-Token: abc", "Accept: */*", "X-Trace: 1"]
        );
    }

    #[test]
    fn test_option_value_equals_form_and_last_wins() {
        let args = args(&["xda", "request", "--uri=/first", "-u", "/second"]);
        assert_eq!(option_value(&args, "--uri", "-u").as_deref(), Some("/second"));
        assert_eq!(option_value(&args, "--data", "-d"), None);
    }

    #[test]
    fn test_option_without_short_form() {
        let args = args(&["xda", "init", "--client", "https://c/relay.html", "", "x"]);
        assert_eq!(
            option_value(&args, "--client", "").as_deref(),
            Some("https://c/relay.html")
        );
    }

    #[test]
    fn test_option_missing_value_ignored() {
        let args = args(&["xda", "response", "--message"]);
        assert!(option_values(&args, "--message", "-m").is_empty());
    }

    #[test]
    fn test_request_command_prints_wire() {
        let args = args(&[
            "xda",
            "request",
            "--client",
            "https://client.example/relay.html",
            "--server",
            "https://api.example",
            "-u",
            "https://api.example/items",
            "-X",
            "GET",
            "-H",
            "X-Token: abc",
        ]);
        let output = run("request", &args, Settings::default()).unwrap();
        assert_eq!(
            output,
            "uri=https%3A%2F%2Fapi.example%2Fitems&requestHeaders=X-Token%3A%20abc&method=GET"
        );
    }

    #[test]
    fn test_init_command_prints_frame() {
        let args = args(&[
            "xda",
            "init",
            "--client",
            "https://client.example/relay.html",
            "--server",
            "https://api.example",
        ]);
        let output = run("init", &args, Settings::default()).unwrap();
        assert_eq!(
            output,
            "clientFrame_0\nhttps://client.example/relay.html#0:init:id=0&server=https%3A%2F%2Fapi.example"
        );
    }

    #[test]
    fn test_response_command_prints_state() {
        let args = args(&["xda", "response", "-m", "status=0&responseText=ok"]);
        let output = run("response", &args, Settings::default()).unwrap();
        let state: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(state["status"], 0);
        assert_eq!(state["responseText"], "ok");
        assert_eq!(state["readyState"], "COMPLETE");
    }

    #[test]
    fn test_unknown_command_fails() {
        assert!(run("bogus", &args(&["xda", "bogus"]), Settings::default()).is_err());
    }
}
