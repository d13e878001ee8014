use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use clap::Parser;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::Level;
use window_stack::snapshot::{JsonCodec, StackSnapshot};
use window_stack::{
    EntityId, Route, Size, StackError, TabStackManager, WindowStackManager, constants,
};

#[derive(Parser, Debug)]
#[command(
    name = "stack-replay",
    version = env!("CARGO_PKG_VERSION"),
    about = "Replay scripted window/tab operations and print the resulting snapshot"
)]
struct ReplayCli {
    /// JSON file holding an array of operations.
    #[arg(short = 's', long = "script", value_name = "FILE")]
    script: PathBuf,

    /// Host viewport used when maximizing, as WIDTHxHEIGHT.
    #[arg(long = "viewport", value_name = "WxH")]
    viewport: Option<String>,

    /// Drive a tab strip instead of a floating window surface.
    #[arg(long = "tabs")]
    tabs: bool,

    /// Snapshot to restore before the script runs.
    #[arg(short = 'i', long = "initial", value_name = "FILE")]
    initial: Option<PathBuf>,

    /// Log every change notification.
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Surface {
    Windows,
    Tabs,
}

#[derive(Debug)]
struct ReplayConfig {
    surface: Surface,
    viewport: Size,
    log_level: Level,
}

impl TryFrom<&ReplayCli> for ReplayConfig {
    type Error = String;

    fn try_from(cli: &ReplayCli) -> Result<Self, Self::Error> {
        let viewport = match cli.viewport.as_deref() {
            Some(raw) => parse_viewport(raw)?,
            None => constants::FALLBACK_VIEWPORT,
        };
        Ok(Self {
            surface: if cli.tabs {
                Surface::Tabs
            } else {
                Surface::Windows
            },
            viewport,
            log_level: if cli.verbose {
                Level::DEBUG
            } else {
                Level::WARN
            },
        })
    }
}

fn parse_viewport(raw: &str) -> Result<Size, String> {
    let (w, h) = raw
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("viewport must look like 1280x800, got {raw:?}"))?;
    let width: f64 = w.trim().parse().map_err(|_| format!("bad viewport width {w:?}"))?;
    let height: f64 = h.trim().parse().map_err(|_| format!("bad viewport height {h:?}"))?;
    if width <= 0.0 || height <= 0.0 {
        return Err("viewport dimensions must be positive".to_string());
    }
    Ok(Size::new(width, height))
}

#[derive(Debug, Error)]
enum ReplayError {
    #[error("invalid arguments: {0}")]
    Config(String),
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("invalid script: {0}")]
    Script(#[from] serde_json::Error),
    #[error(transparent)]
    Stack(#[from] StackError),
    #[error("step {step}: no route named {name:?}")]
    UnknownRoute { step: usize, name: String },
    #[error("step {step}: `{op}` is not supported on {surface:?}")]
    Unsupported {
        step: usize,
        op: &'static str,
        surface: Surface,
    },
}

/// Routes in a replay script are identified by name only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
struct NamedRoute(String);

impl Route for NamedRoute {
    type Key = String;

    fn key(&self) -> Self::Key {
        self.0.clone()
    }

    fn title(&self) -> String {
        self.0.clone()
    }

    fn on_remove(&mut self) {
        tracing::debug!(route = %self.0, "route torn down");
    }
}

fn default_forward() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum Op {
    Push {
        route: String,
    },
    Activate {
        route: String,
    },
    Focus {
        route: String,
    },
    Front {
        route: String,
    },
    Minimize {
        route: String,
    },
    Maximize {
        route: String,
    },
    Restore {
        route: String,
    },
    Pin {
        route: String,
    },
    Close {
        route: String,
    },
    Move {
        route: String,
        dx: f64,
        dy: f64,
    },
    Resize {
        route: String,
        width: f64,
        height: f64,
        #[serde(default)]
        x: Option<f64>,
        #[serde(default)]
        y: Option<f64>,
    },
    GotoIndex {
        index: usize,
    },
    MoveTab {
        route: String,
        to: usize,
    },
    Cycle {
        #[serde(default = "default_forward")]
        forward: bool,
    },
    Reset,
}

impl Op {
    fn name(&self) -> &'static str {
        match self {
            Op::Push { .. } => "push",
            Op::Activate { .. } => "activate",
            Op::Focus { .. } => "focus",
            Op::Front { .. } => "front",
            Op::Minimize { .. } => "minimize",
            Op::Maximize { .. } => "maximize",
            Op::Restore { .. } => "restore",
            Op::Pin { .. } => "pin",
            Op::Close { .. } => "close",
            Op::Move { .. } => "move",
            Op::Resize { .. } => "resize",
            Op::GotoIndex { .. } => "goto_index",
            Op::MoveTab { .. } => "move_tab",
            Op::Cycle { .. } => "cycle",
            Op::Reset => "reset",
        }
    }
}

fn read_file(path: &Path) -> Result<String, ReplayError> {
    fs::read_to_string(path).map_err(|source| ReplayError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn load_script(path: &Path) -> Result<Vec<Op>, ReplayError> {
    Ok(serde_json::from_str(&read_file(path)?)?)
}

fn window_lookup(
    wm: &WindowStackManager<NamedRoute>,
    step: usize,
    name: &str,
) -> Result<EntityId, ReplayError> {
    wm.find(&name.to_string())
        .ok_or_else(|| ReplayError::UnknownRoute {
            step,
            name: name.to_string(),
        })
}

fn tab_lookup(
    tabs: &TabStackManager<NamedRoute>,
    step: usize,
    name: &str,
) -> Result<EntityId, ReplayError> {
    tabs.find(&name.to_string())
        .ok_or_else(|| ReplayError::UnknownRoute {
            step,
            name: name.to_string(),
        })
}

fn apply_window_op(
    wm: &mut WindowStackManager<NamedRoute>,
    step: usize,
    op: &Op,
    viewport: Size,
) -> Result<(), ReplayError> {
    match op {
        Op::Push { route } => {
            wm.push(NamedRoute(route.clone()));
        }
        Op::Activate { route } => {
            wm.activate_route(NamedRoute(route.clone()));
        }
        Op::Focus { route } => wm.focus_window(window_lookup(wm, step, route)?)?,
        Op::Front { route } => wm.bring_to_front(window_lookup(wm, step, route)?)?,
        Op::Minimize { route } => wm.minimize_window(window_lookup(wm, step, route)?)?,
        Op::Maximize { route } => {
            wm.maximize_window(window_lookup(wm, step, route)?, viewport)?
        }
        Op::Restore { route } => wm.restore_window(window_lookup(wm, step, route)?)?,
        Op::Pin { route } => wm.toggle_pin_window(window_lookup(wm, step, route)?)?,
        Op::Close { route } => {
            wm.close_window(window_lookup(wm, step, route)?)?;
        }
        Op::Move { route, dx, dy } => {
            let id = window_lookup(wm, step, route)?;
            if !wm.move_window(id, *dx, *dy)? {
                tracing::warn!(step, route = %route, "move ignored; window not floating");
            }
        }
        Op::Resize {
            route,
            width,
            height,
            x,
            y,
        } => {
            let id = window_lookup(wm, step, route)?;
            if !wm.resize_window(id, *width, *height, *x, *y)? {
                tracing::warn!(step, route = %route, "resize ignored; window not floating");
            }
        }
        Op::Cycle { forward } => {
            wm.cycle_focus(*forward);
        }
        Op::Reset => wm.reset(),
        Op::GotoIndex { .. } | Op::MoveTab { .. } => {
            return Err(ReplayError::Unsupported {
                step,
                op: op.name(),
                surface: Surface::Windows,
            });
        }
    }
    Ok(())
}

fn apply_tab_op(
    tabs: &mut TabStackManager<NamedRoute>,
    step: usize,
    op: &Op,
) -> Result<(), ReplayError> {
    match op {
        Op::Push { route } => {
            tabs.push(NamedRoute(route.clone()));
        }
        Op::Activate { route } => {
            tabs.activate_route(NamedRoute(route.clone()));
        }
        Op::Focus { route } => tabs.go_to(tab_lookup(tabs, step, route)?)?,
        Op::Close { route } => {
            tabs.close_tab(tab_lookup(tabs, step, route)?)?;
        }
        Op::GotoIndex { index } => {
            tabs.go_to_index(*index)?;
        }
        Op::MoveTab { route, to } => tabs.move_tab(tab_lookup(tabs, step, route)?, *to)?,
        Op::Cycle { forward } => {
            tabs.cycle(*forward);
        }
        Op::Reset => tabs.reset(),
        _ => {
            return Err(ReplayError::Unsupported {
                step,
                op: op.name(),
                surface: Surface::Tabs,
            });
        }
    }
    Ok(())
}

fn replay(
    config: &ReplayConfig,
    ops: &[Op],
    initial: Option<&StackSnapshot>,
) -> Result<StackSnapshot, ReplayError> {
    let codec = JsonCodec::<NamedRoute>::new();
    match config.surface {
        Surface::Windows => {
            let mut wm = WindowStackManager::<NamedRoute>::new();
            wm.subscribe(|event| tracing::debug!(?event, "window stack changed"));
            if let Some(snapshot) = initial {
                wm.restore_snapshot(snapshot, &codec, config.viewport)?;
            }
            for (step, op) in ops.iter().enumerate() {
                apply_window_op(&mut wm, step, op, config.viewport)?;
            }
            Ok(wm.snapshot(&codec)?)
        }
        Surface::Tabs => {
            let mut tabs = TabStackManager::<NamedRoute>::new();
            tabs.subscribe(|event| tracing::debug!(?event, "tab stack changed"));
            if let Some(snapshot) = initial {
                tabs.restore_snapshot(snapshot, &codec)?;
            }
            for (step, op) in ops.iter().enumerate() {
                apply_tab_op(&mut tabs, step, op)?;
            }
            Ok(tabs.snapshot(&codec)?)
        }
    }
}

fn run(cli: &ReplayCli) -> Result<String, ReplayError> {
    let config = ReplayConfig::try_from(cli).map_err(ReplayError::Config)?;
    window_stack::tracing_sub::init_with_level(config.log_level);
    let ops = load_script(&cli.script)?;
    let initial = match &cli.initial {
        Some(path) => Some(StackSnapshot::from_json(&read_file(path)?)?),
        None => None,
    };
    let snapshot = replay(&config, &ops, initial.as_ref())?;
    Ok(snapshot.to_json()?)
}

fn main() -> io::Result<()> {
    let args = ReplayCli::parse();
    let output = run(&args).map_err(io::Error::other)?;
    println!("{output}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use std::io::Write;

    fn windows_config() -> ReplayConfig {
        ReplayConfig {
            surface: Surface::Windows,
            viewport: Size::new(1000.0, 700.0),
            log_level: Level::WARN,
        }
    }

    fn parse(script: &str) -> Vec<Op> {
        serde_json::from_str(script).unwrap()
    }

    #[test]
    fn viewport_parsing() {
        assert_eq!(parse_viewport("1920x1080").unwrap(), Size::new(1920.0, 1080.0));
        assert_eq!(parse_viewport("800X600").unwrap(), Size::new(800.0, 600.0));
        assert!(parse_viewport("800").is_err());
        assert!(parse_viewport("0x600").is_err());
        assert!(parse_viewport("wide x tall").is_err());
    }

    #[test]
    fn window_script_produces_snapshot() {
        let ops = parse(indoc! {r#"
            [
              {"op": "push", "route": "mail"},
              {"op": "push", "route": "chat"},
              {"op": "push", "route": "music"},
              {"op": "minimize", "route": "music"},
              {"op": "maximize", "route": "mail"},
              {"op": "move", "route": "chat", "dx": 10, "dy": -5},
              {"op": "close", "route": "chat"}
            ]
        "#});
        let snapshot = replay(&windows_config(), &ops, None).unwrap();
        assert_eq!(snapshot.entries, vec!["mail", "music"]);
        assert_eq!(snapshot.active_index, Some(0));
        let states: Vec<_> = snapshot.per_entity_state.iter().map(|s| s.state).collect();
        assert_eq!(
            states,
            vec![
                window_stack::WindowState::Maximized,
                window_stack::WindowState::Minimized
            ]
        );
    }

    #[test]
    fn unknown_route_is_reported_with_step() {
        let ops = parse(r#"[{"op": "focus", "route": "ghost"}]"#);
        let err = replay(&windows_config(), &ops, None).unwrap_err();
        assert!(matches!(err, ReplayError::UnknownRoute { step: 0, .. }));
    }

    #[test]
    fn tab_only_ops_rejected_on_windows() {
        let ops = parse(r#"[{"op": "goto_index", "index": 0}]"#);
        let err = replay(&windows_config(), &ops, None).unwrap_err();
        assert!(matches!(err, ReplayError::Unsupported { op: "goto_index", .. }));
    }

    #[test]
    fn tab_script_tracks_active_tab() {
        let config = ReplayConfig {
            surface: Surface::Tabs,
            ..windows_config()
        };
        let ops = parse(indoc! {r#"
            [
              {"op": "push", "route": "a"},
              {"op": "push", "route": "b"},
              {"op": "push", "route": "c"},
              {"op": "goto_index", "index": 1},
              {"op": "close", "route": "a"},
              {"op": "cycle"}
            ]
        "#});
        let snapshot = replay(&config, &ops, None).unwrap();
        assert_eq!(snapshot.entries, vec!["b", "c"]);
        assert_eq!(snapshot.active_index, Some(1));
        assert!(snapshot.per_entity_state.is_empty());
    }

    #[test]
    fn initial_snapshot_is_restored_first() {
        let initial = StackSnapshot::from_json(indoc! {r#"
            {"entries": ["notes", "term"], "activeIndex": 0}
        "#})
        .unwrap();
        let ops = parse(r#"[{"op": "activate", "route": "term"}]"#);
        let snapshot = replay(&windows_config(), &ops, Some(&initial)).unwrap();
        assert_eq!(snapshot.entries, vec!["notes", "term"]);
        assert_eq!(snapshot.active_index, Some(1));
    }

    #[test]
    fn script_loads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"op": "push", "route": "x"}}, {{"op": "reset"}}]"#).unwrap();
        let ops = load_script(file.path()).unwrap();
        assert_eq!(
            ops,
            vec![
                Op::Push {
                    route: "x".to_string()
                },
                Op::Reset
            ]
        );
    }

    #[test]
    fn missing_script_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_script(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ReplayError::Read { .. }));
    }
}
