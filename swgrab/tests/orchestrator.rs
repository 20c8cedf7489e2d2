//! End-to-end runs of the orchestrator against a scripted device.

use std::collections::HashMap;
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use swgrab::error::PersistError;
use swgrab::{
    COMMANDS, CliConnector, CommandError, CommandErrorKind, ConnectionError, ConnectionErrorKind,
    Connector, ConnectionParams, DeviceSession, Error, Orchestrator, ParamOverrides, ParamsBuilder,
    Persister, Reporter, ResultRecord, RunState,
};

const SHOW_VERSION: &str = "\
Cisco IOS Software, C2960 Software (C2960-LANBASEK9-M), Version 12.2(55)SE7, RELEASE SOFTWARE (fc1)
Technical Support: http://www.cisco.com/techsupport
ROM: Bootstrap program is C2960 boot loader

cisco WS-C2960-24TT-L (PowerPC405) processor (revision B0) with 65536K bytes of memory.
Processor board ID FOC1010X1YZ";

/// What the device answers for one command.
#[derive(Clone)]
enum Reply {
    Output(String),
    Fail(CommandErrorKind),
}

/// Everything the scripted device saw.
#[derive(Default)]
struct DeviceLog {
    connects: usize,
    sent: Vec<String>,
    closed: usize,
}

#[derive(Clone)]
struct ScriptedConnector {
    replies: HashMap<&'static str, Reply>,
    refuse: Option<ConnectionErrorKind>,
    log: Arc<Mutex<DeviceLog>>,
}

impl ScriptedConnector {
    /// A device that answers every command with valid data.
    fn healthy() -> Self {
        let mut replies = HashMap::new();
        replies.insert("show version", Reply::Output(SHOW_VERSION.to_string()));
        replies.insert(
            "show startup-config",
            Reply::Output("Using 1234 out of 65536 bytes\n!\nhostname sw1\n!\nend".to_string()),
        );
        replies.insert(
            "show running-config",
            Reply::Output("Building configuration...\n!\nhostname sw1\n!\nend".to_string()),
        );
        replies.insert(
            "show access-lists",
            Reply::Output("Standard IP access list 10\n    10 permit 10.0.0.0, wildcard bits 0.0.0.255".to_string()),
        );
        replies.insert(
            "show ip interface brief",
            Reply::Output(
                "Interface              IP-Address      OK? Method Status                Protocol\n\
                 Vlan1                  10.0.0.2        YES NVRAM  up                    up"
                    .to_string(),
            ),
        );
        replies.insert(
            "show interfaces",
            Reply::Output("Vlan1 is up, line protocol is up\n  Hardware is EtherSVI".to_string()),
        );

        Self {
            replies,
            refuse: None,
            log: Arc::new(Mutex::new(DeviceLog::default())),
        }
    }

    fn reply(mut self, command: &'static str, reply: Reply) -> Self {
        self.replies.insert(command, reply);
        self
    }

    fn refusing(mut self, kind: ConnectionErrorKind) -> Self {
        self.refuse = Some(kind);
        self
    }

    fn sent(&self) -> Vec<String> {
        self.log.lock().unwrap().sent.clone()
    }

    fn connects(&self) -> usize {
        self.log.lock().unwrap().connects
    }

    fn closed(&self) -> usize {
        self.log.lock().unwrap().closed
    }
}

struct ScriptedSession {
    replies: HashMap<&'static str, Reply>,
    log: Arc<Mutex<DeviceLog>>,
}

impl Connector for ScriptedConnector {
    type Session = ScriptedSession;

    async fn connect(&self, _params: &ConnectionParams) -> Result<ScriptedSession, ConnectionError> {
        self.log.lock().unwrap().connects += 1;
        if let Some(kind) = self.refuse {
            return Err(ConnectionError::new(kind, "scripted refusal"));
        }
        Ok(ScriptedSession {
            replies: self.replies.clone(),
            log: self.log.clone(),
        })
    }
}

impl DeviceSession for ScriptedSession {
    async fn run(&mut self, command: &str, _timeout: Duration) -> Result<String, CommandError> {
        self.log.lock().unwrap().sent.push(command.to_string());
        match self.replies.get(command) {
            Some(Reply::Output(text)) => Ok(text.clone()),
            Some(Reply::Fail(kind)) => Err(CommandError::new(command, *kind, "scripted failure")),
            None => Ok(String::new()),
        }
    }

    async fn close(self) {
        self.log.lock().unwrap().closed += 1;
    }
}

#[derive(Default)]
struct RecordingReporter {
    reports: Vec<ResultRecord>,
}

impl Reporter for RecordingReporter {
    fn report(&mut self, record: &ResultRecord) {
        self.reports.push(record.clone());
    }
}

#[derive(Default)]
struct RecordingPersister {
    stored: Vec<ResultRecord>,
    fail: bool,
}

impl Persister for RecordingPersister {
    fn persist(&mut self, record: &ResultRecord) -> Result<(), PersistError> {
        if self.fail {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only").into());
        }
        self.stored.push(record.clone());
        Ok(())
    }
}

fn params() -> ConnectionParams {
    ParamsBuilder::defaults()
        .host("10.0.0.1")
        .username("admin")
        .password("pw")
        .secret("en")
        .build()
        .unwrap()
}

fn orchestrator(
    connector: &ScriptedConnector,
) -> Orchestrator<ScriptedConnector, RecordingReporter, RecordingPersister> {
    Orchestrator::new(
        params(),
        connector.clone(),
        RecordingReporter::default(),
        RecordingPersister::default(),
    )
}

fn all_commands() -> Vec<String> {
    COMMANDS.iter().map(|d| d.command.to_string()).collect()
}

#[tokio::test]
async fn test_healthy_device_completes_run() {
    let device = ScriptedConnector::healthy();
    let mut run = orchestrator(&device);

    let record = run.run().await.unwrap();

    assert_eq!(run.state(), RunState::Done);
    assert_eq!(run.failed_phase(), None);
    assert!(record.is_complete());
    assert_eq!(
        record.software_version(),
        Some("Cisco IOS Software, C2960 Software (C2960-LANBASEK9-M), Version 12.2(55)SE7, RELEASE SOFTWARE (fc1)")
    );
    assert_eq!(
        record.hardware_version(),
        Some("cisco WS-C2960-24TT-L (PowerPC405) processor (revision B0) with 65536K bytes of memory.")
    );
    assert!(record.access_lists().unwrap().starts_with("Standard IP access list 10"));

    assert_eq!(device.sent(), all_commands());
    assert_eq!(device.closed(), 1);
    assert_eq!(run.reporter().reports, vec![record.clone()]);
    assert_eq!(run.persister().stored, vec![record]);
}

#[tokio::test]
async fn test_auth_failure_aborts_before_any_command() {
    let device = ScriptedConnector::healthy().refusing(ConnectionErrorKind::AuthFailure);
    let mut run = orchestrator(&device);

    let err = run.run().await.unwrap_err();

    match err {
        Error::Connection(e) => assert_eq!(e.kind, ConnectionErrorKind::AuthFailure),
        other => panic!("expected connection error, got {other:?}"),
    }
    assert_eq!(run.state(), RunState::Aborted);
    assert_eq!(run.failed_phase(), Some(RunState::Connecting));
    assert_eq!(device.connects(), 1);
    assert!(device.sent().is_empty());
    assert_eq!(device.closed(), 0);
    assert!(run.reporter().reports.is_empty());
    assert!(run.persister().stored.is_empty());
}

#[tokio::test]
async fn test_empty_access_lists_fails_validation() {
    let device = ScriptedConnector::healthy().reply("show access-lists", Reply::Output(String::new()));
    let mut run = orchestrator(&device);

    let err = run.run().await.unwrap_err();

    match err {
        Error::Incomplete(e) => assert_eq!(e.missing, vec!["access_lists"]),
        other => panic!("expected incomplete data, got {other:?}"),
    }
    assert_eq!(run.state(), RunState::Aborted);
    assert_eq!(run.failed_phase(), Some(RunState::Validating));
    assert_eq!(device.sent(), all_commands());
    assert_eq!(device.closed(), 1);
    assert!(run.reporter().reports.is_empty());
    assert!(run.persister().stored.is_empty());
}

#[tokio::test]
async fn test_unrecognised_banner_fails_validation() {
    let device = ScriptedConnector::healthy().reply(
        "show version",
        Reply::Output("Juniper Networks JUNOS 20.4R3".to_string()),
    );
    let mut run = orchestrator(&device);

    let err = run.run().await.unwrap_err();

    match err {
        Error::Incomplete(e) => {
            assert_eq!(e.missing, vec!["software_version", "hardware_version"])
        }
        other => panic!("expected incomplete data, got {other:?}"),
    }
    assert_eq!(run.failed_phase(), Some(RunState::Validating));
}

#[tokio::test]
async fn test_command_failure_stops_collection() {
    for (k, descriptor) in COMMANDS.iter().enumerate() {
        let device = ScriptedConnector::healthy()
            .reply(descriptor.command, Reply::Fail(CommandErrorKind::ReadTimeout));
        let mut run = orchestrator(&device);

        let err = run.run().await.unwrap_err();

        match err {
            Error::Command(e) => {
                assert_eq!(e.command, descriptor.command);
                assert_eq!(e.kind, CommandErrorKind::ReadTimeout);
            }
            other => panic!("expected command error, got {other:?}"),
        }
        assert_eq!(run.state(), RunState::Aborted);
        assert_eq!(run.failed_phase(), Some(RunState::Collecting));
        // Nothing after the failing command is sent
        assert_eq!(device.sent(), all_commands()[..=k].to_vec());
        assert_eq!(device.closed(), 1, "session closed after failure at {k}");
        assert!(run.reporter().reports.is_empty());
        assert!(run.persister().stored.is_empty());
    }
}

#[tokio::test]
async fn test_transport_failure_is_command_error() {
    let device = ScriptedConnector::healthy()
        .reply("show interfaces", Reply::Fail(CommandErrorKind::Transport));
    let mut run = orchestrator(&device);

    let err = run.run().await.unwrap_err();

    assert!(matches!(err, Error::Command(ref e) if e.kind == CommandErrorKind::Transport));
    assert_eq!(swgrab::exit::exit_code(&err), swgrab::exit::codes::COMMAND_ERROR);
}

#[tokio::test]
async fn test_persist_failure_aborts_after_report() {
    let device = ScriptedConnector::healthy();
    let mut run = Orchestrator::new(
        params(),
        device.clone(),
        RecordingReporter::default(),
        RecordingPersister {
            fail: true,
            ..Default::default()
        },
    );

    let err = run.run().await.unwrap_err();

    assert!(matches!(err, Error::Persist(_)));
    assert_eq!(run.state(), RunState::Aborted);
    assert_eq!(run.failed_phase(), Some(RunState::Reporting));
    assert_eq!(run.reporter().reports.len(), 1);
    assert_eq!(device.closed(), 1);
}

#[tokio::test]
async fn test_file_persister_appends_one_line_per_run() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("db").join("output_data.txt");

    for _ in 0..2 {
        let device = ScriptedConnector::healthy();
        let mut run = Orchestrator::new(
            params(),
            device,
            RecordingReporter::default(),
            swgrab::JsonLinesFile::new(&path),
        );
        run.run().await.unwrap();
    }

    let contents = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 2);
    let value: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(value["sw_config"]["start_config"], "Using 1234 out of 65536 bytes\n!\nhostname sw1\n!\nend");
    assert!(value["sw_version"]["soft_version"].as_str().unwrap().ends_with("(fc1)"));
}

/// Read one line from the client, skipping telnet commands.
async fn read_line(stream: &mut TcpStream) -> Option<String> {
    let mut line = Vec::new();
    let mut byte = [0u8; 1];
    loop {
        if stream.read(&mut byte).await.ok()? == 0 {
            return None;
        }
        match byte[0] {
            255 => {
                let mut skip = [0u8; 2];
                stream.read_exact(&mut skip).await.ok()?;
            }
            b'\n' => {
                let text = String::from_utf8_lossy(&line);
                return Some(text.trim_end_matches('\r').to_string());
            }
            b => line.push(b),
        }
    }
}

/// A telnet switch that lands in privileged mode and refuses `show access-lists`.
async fn spawn_switch_without_acls() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        stream.write_all(b"\r\nUsername: ").await.unwrap();
        if read_line(&mut stream).await.is_none() {
            return;
        }
        stream.write_all(b"Password: ").await.unwrap();
        if read_line(&mut stream).await.is_none() {
            return;
        }
        stream.write_all(b"\r\nsw1#").await.unwrap();

        while let Some(line) = read_line(&mut stream).await {
            let body = match line.as_str() {
                "exit" => return,
                "show version" => SHOW_VERSION.replace('\n', "\r\n"),
                "show access-lists" => {
                    "                  ^\r\n% Invalid input detected at '^' marker.\r\n".to_string()
                }
                other if other.starts_with("terminal ") => String::new(),
                other => format!("output of {other}"),
            };
            let reply = format!("{line}\r\n{body}\r\nsw1#");
            if stream.write_all(reply.as_bytes()).await.is_err() {
                return;
            }
        }
    });

    port
}

#[tokio::test]
async fn test_rejected_command_over_telnet_fails_validation() {
    let port = spawn_switch_without_acls().await;
    let params = ParamsBuilder::defaults()
        .host("127.0.0.1")
        .username("admin")
        .password("pw")
        .overlay(ParamOverrides {
            port: Some(port),
            device_type: Some("cisco_ios_telnet".to_string()),
            conn_timeout: Some(2),
            banner_timeout: Some(2),
            blocking_timeout: Some(2),
            timeout: Some(2),
            ..Default::default()
        })
        .build()
        .unwrap();
    let mut run = Orchestrator::new(
        params,
        CliConnector,
        RecordingReporter::default(),
        RecordingPersister::default(),
    );

    let err = run.run().await.unwrap_err();

    match err {
        Error::Incomplete(e) => assert_eq!(e.missing, vec!["access_lists"]),
        other => panic!("expected incomplete data, got {other:?}"),
    }
    assert_eq!(run.failed_phase(), Some(RunState::Validating));
    assert!(run.reporter().reports.is_empty());
    assert!(run.persister().stored.is_empty());
}
