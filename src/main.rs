use clap::Parser;
use config::Config;
use log::{error, info};
use packets::mysql::{HandshakeMessage, HandshakeResponse};
use std::fs::File;
use std::io::BufReader;
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::init();
    let conf = Config::parse();

    match replay(&conf) {
        Ok(response) => {
            println!("{}", hex::encode(&response));
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("handshake with {:?} failed: {}", conf.greeting, e);
            ExitCode::FAILURE
        }
    }
}

/// Decodes the captured greeting and builds the response we would send back.
fn replay(conf: &Config) -> packets::Result<Vec<u8>> {
    let mut reader = BufReader::new(File::open(&conf.greeting)?);
    let greeting = HandshakeMessage::read_server(&mut reader)?;
    info!(
        "server {} connection id {} auth plugin {:?} capabilities {:#010x}",
        greeting.server_version_str(),
        greeting.connection_id,
        greeting.auth_plugin_name_str(),
        greeting.capabilities
    );

    let mut response = Vec::new();
    HandshakeResponse::encode(
        &mut response,
        greeting.next_sequence_id(),
        &greeting,
        &conf.username,
        &conf.password,
    )?;
    Ok(response)
}
