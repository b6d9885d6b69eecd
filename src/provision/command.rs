//! External build command
//!
//! The expensive build step is delegated to a configured external command
//! (for example a site-specific installer script). Build parameters are
//! passed through argv placeholders rather than ambient state, so nothing
//! global is mutated around the build.

use crate::error::{DbseedError, DbseedResult};
use crate::provision::Builder;
use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

/// Max number of output lines to include in build error messages.
const BUILD_ERROR_TAIL_LINES: usize = 20;

/// Builder that runs a configured command
///
/// Placeholders substituted in every argv element:
/// `{database}`, `{components}` (comma-joined), `{demo}` (`true`/`false`).
pub struct CommandBuilder {
    argv: Vec<String>,
}

impl CommandBuilder {
    /// Create a builder from the configured argv
    pub fn new(argv: Vec<String>) -> Self {
        Self { argv }
    }

    fn render(&self, database: &str, components: &[String], demo: bool) -> Vec<String> {
        let components = components.join(",");
        let demo = if demo { "true" } else { "false" };
        self.argv
            .iter()
            .map(|arg| {
                arg.replace("{database}", database)
                    .replace("{components}", &components)
                    .replace("{demo}", demo)
            })
            .collect()
    }
}

#[async_trait]
impl Builder for CommandBuilder {
    async fn build_fresh(
        &self,
        database: &str,
        components: &[String],
        demo: bool,
    ) -> DbseedResult<()> {
        if self.argv.is_empty() {
            return Err(DbseedError::User(
                "builder.command is not configured".to_string(),
            ));
        }

        let argv = self.render(database, components, demo);
        let rendered = argv.join(" ");
        info!("building {database} with components [{}]", components.join(", "));
        debug!("running build command: {rendered}");

        let output = Command::new(&argv[0])
            .args(&argv[1..])
            .output()
            .await
            .map_err(|e| DbseedError::BuildFailed {
                command: rendered.clone(),
                reason: e.to_string(),
            })?;

        if output.status.success() {
            Ok(())
        } else {
            let stdout = String::from_utf8_lossy(&output.stdout);
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(DbseedError::BuildFailed {
                command: rendered,
                reason: output_tail(&stdout, &stderr),
            })
        }
    }
}

/// Last lines of combined build output, enough to act on without flooding.
fn output_tail(stdout: &str, stderr: &str) -> String {
    let lines: Vec<&str> = stdout.lines().chain(stderr.lines()).collect();
    let start = lines.len().saturating_sub(BUILD_ERROR_TAIL_LINES);
    lines[start..].join("\n")
}
