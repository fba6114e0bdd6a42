#![forbid(unsafe_code)]

use od_api::{DirectoryService, LineServer, ServiceConfig, SessionLog};
use od_storage::DirectoryStore;
use std::io::{BufRead, Write};

const SERVER_NAME: &str = "od_api";
const SERVER_VERSION: &str = "0.1.0";

fn usage() -> &'static str {
    "od_api — organization directory service (stdio JSON lines)\n\n\
USAGE:\n\
  od_api [--storage-dir DIR] [--api-key KEY]\n\
\n\
FLAGS:\n\
  -h, --help       Print this help and exit\n\
  -V, --version    Print version and exit\n\
\n\
NOTES:\n\
  - One JSON object per line: {\"op\": ..., \"api_key\": ..., ...}\n\
  - Env fallbacks: ORGDIR_STORAGE_DIR, ORGDIR_API_KEY\n"
}

fn version_line() -> String {
    format!("{SERVER_NAME} {SERVER_VERSION}")
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = std::env::args().collect::<Vec<_>>();
    if args
        .iter()
        .any(|arg| matches!(arg.as_str(), "-h" | "--help"))
    {
        print!("{}", usage());
        return Ok(());
    }
    if args
        .iter()
        .any(|arg| matches!(arg.as_str(), "-V" | "--version"))
    {
        println!("{}", version_line());
        return Ok(());
    }

    let config = ServiceConfig::from_args();
    let store = DirectoryStore::open(&config.storage_dir)?;
    let log = SessionLog::new(&config.storage_dir);
    let service = DirectoryService::new(store);
    let mut server = LineServer::new(service, config.api_key, log);

    run_stdio(&mut server)
}

fn run_stdio(server: &mut LineServer) -> Result<(), Box<dyn std::error::Error>> {
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout().lock();

    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let response = server.handle_line(&line);
        writeln!(stdout, "{response}")?;
        stdout.flush()?;
    }

    server.note_exit("stdin closed");
    Ok(())
}
