use crate::cli::args::OutputFormat;
use crate::core::remote::RemoteFile;
use crate::domain::config::FlipperConfig;
use crate::infrastructure::serial::{Endpoint, EndpointSource};
use std::io::{self, Write};
use tabled::{Table, Tabled};

/// Output writer trait for different formats
pub trait OutputWriter {
    fn write_endpoint(&self, endpoint: &Endpoint) -> Result<(), OutputError>;
    fn write_files(&self, files: &[RemoteFile]) -> Result<(), OutputError>;
    fn write_lines(&self, command: &str, lines: &[String]) -> Result<(), OutputError>;
    fn write_result(&self, target: &str, result: &str) -> Result<(), OutputError>;
    fn write_config(&self, config: &FlipperConfig) -> Result<(), OutputError>;
    fn write_message(&self, message: &str) -> Result<(), OutputError>;
    fn write_error(&self, error: &str) -> Result<(), OutputError>;
}

/// Output formatting errors
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("TOML serialization error: {0}")]
    TomlError(#[from] toml::ser::Error),
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

impl From<OutputError> for crate::domain::error::FlipperError {
    fn from(err: OutputError) -> Self {
        Self::Output(err.to_string())
    }
}

/// Console output writer
pub struct ConsoleWriter {
    format: OutputFormat,
}

impl ConsoleWriter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    fn emit(&self, content: &str) -> Result<(), OutputError> {
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{}", content)?;
        Ok(())
    }
}

impl OutputWriter for ConsoleWriter {
    fn write_endpoint(&self, endpoint: &Endpoint) -> Result<(), OutputError> {
        self.emit(&render_endpoint(&self.format, endpoint)?)
    }

    fn write_files(&self, files: &[RemoteFile]) -> Result<(), OutputError> {
        self.emit(&render_files(&self.format, files)?)
    }

    fn write_lines(&self, command: &str, lines: &[String]) -> Result<(), OutputError> {
        let content = match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(&serde_json::json!({
                "command": command,
                "lines": lines,
            }))?,
            _ => lines.join("\n"),
        };
        self.emit(&content)
    }

    fn write_result(&self, target: &str, result: &str) -> Result<(), OutputError> {
        let content = match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(&serde_json::json!({
                "target": target,
                "result": result,
            }))?,
            OutputFormat::Csv => format!("target,result\n{},{}", target, result),
            _ => result.to_string(),
        };
        self.emit(&content)
    }

    fn write_config(&self, config: &FlipperConfig) -> Result<(), OutputError> {
        let content = match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(config)?,
            _ => toml::to_string_pretty(config)?,
        };
        self.emit(content.trim_end())
    }

    fn write_message(&self, message: &str) -> Result<(), OutputError> {
        match self.format {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "message": message,
                    "level": "info"
                });
                self.emit(&serde_json::to_string_pretty(&output)?)
            }
            _ => self.emit(message),
        }
    }

    fn write_error(&self, error: &str) -> Result<(), OutputError> {
        match self.format {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "error": error,
                    "level": "error"
                });
                eprintln!("{}", serde_json::to_string_pretty(&output)?);
            }
            _ => {
                eprintln!("Error: {}", error);
            }
        }
        Ok(())
    }
}

fn render_endpoint(format: &OutputFormat, endpoint: &Endpoint) -> Result<String, OutputError> {
    let source = match endpoint.source {
        EndpointSource::Discovered => "discovered",
        EndpointSource::Explicit => "explicit",
    };

    Ok(match format {
        OutputFormat::Text => endpoint.to_string(),
        OutputFormat::Json => serde_json::to_string_pretty(endpoint)?,
        OutputFormat::Table => Table::new(vec![EndpointTableRow {
            path: endpoint.to_string(),
            source: source.to_string(),
        }])
        .to_string(),
        OutputFormat::Csv => format!("path,source\n{},{}", endpoint, source),
    })
}

fn render_files(format: &OutputFormat, files: &[RemoteFile]) -> Result<String, OutputError> {
    Ok(match format {
        OutputFormat::Text => files
            .iter()
            .map(|file| format!("{}\t{}", file.name, file.path))
            .collect::<Vec<_>>()
            .join("\n"),
        OutputFormat::Json => serde_json::to_string_pretty(&serde_json::json!({
            "items": files,
            "count": files.len(),
        }))?,
        OutputFormat::Table => {
            let rows: Vec<FileTableRow> = files.iter().map(FileTableRow::from).collect();
            Table::new(rows).to_string()
        }
        OutputFormat::Csv => {
            let mut csv = "name,path".to_string();
            for file in files {
                csv.push_str(&format!("\n{},{}", file.name, file.path));
            }
            csv
        }
    })
}

/// Table row for a remote file
#[derive(Tabled)]
struct FileTableRow {
    name: String,
    path: String,
}

impl From<&RemoteFile> for FileTableRow {
    fn from(file: &RemoteFile) -> Self {
        Self {
            name: file.name.clone(),
            path: file.path.clone(),
        }
    }
}

/// Table row for the resolved endpoint
#[derive(Tabled)]
struct EndpointTableRow {
    path: String,
    source: String,
}
