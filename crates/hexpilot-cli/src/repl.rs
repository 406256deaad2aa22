//! Interactive console for driving the robot.
//!
//! Supported commands:
//!   help                        – show this list
//!   status                      – link state, telemetry, video feed URL
//!   fwd / back / left / right   – start walking or turning (latched)
//!   stop                        – halt both movement axes
//!   look up|down|left|right     – start panning/tilting the camera
//!   look stop                   – halt both camera axes
//!   home                        – re-centre the camera mount
//!   light breath <r> <g> <b>    – breathing animation with an RGB colour
//!   light rainbow|police|stars  – switch the LED animation
//!   light off                   – turn the LEDs off
//!   servo list|toggle|group|legs|clear   – edit the calibration selection
//!   servo set +|- <steps>       – nudge the selected servos (1-20 steps)
//!   servo save|center|reset     – batch operation over the selection
//!   video                       – print the video feed URL
//!   quit | exit                 – halt the robot and leave

use colored::Colorize;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

use hexpilot_link::{LinkError, LinkHandle};
use hexpilot_panels::{
    CameraPad, DriveDirection, LightMode, LightPanel, MotionPad, PanDirection, ServoOp,
    ServoPanel, StepDirection, TiltDirection, TurnDirection,
};
use hexpilot_types::{LegGroup, LinkState, METRICS, MetricLevel, Reply, ReplyStatus, SERVOS};

use crate::config::Config;

#[derive(PartialEq)]
enum Flow {
    Continue,
    Quit,
}

/// Entry point for the interactive console.
///
/// Runs until `quit`, EOF, or Ctrl-C; all three halt the movement axes
/// before the link is closed, so the robot is never left walking.
pub async fn run(cfg: Config, handle: LinkHandle) {
    let mut console = Console::new(cfg, handle);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("{} ", "hexpilot>".bold().cyan());
        std::io::stdout().flush().ok();

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                println!();
                println!("{}", "⚠  Ctrl-C received – halting the robot …".yellow().bold());
                break;
            }
            line = lines.next_line() => match line {
                Ok(Some(line)) => {
                    if console.dispatch(line.trim()).await == Flow::Quit {
                        break;
                    }
                }
                Ok(None) => break, // EOF
                Err(e) => {
                    eprintln!("{}: {}", "Read error".red(), e);
                    break;
                }
            }
        }
    }

    console.halt().await;
    console.close().await;
    println!("{}", "Goodbye.".green());
}

/// The console's working state: one pad per control surface, all sharing
/// the same link.
struct Console {
    cfg: Config,
    handle: LinkHandle,
    motion: MotionPad<LinkHandle>,
    camera: CameraPad<LinkHandle>,
    lights: LightPanel<LinkHandle>,
    servos: ServoPanel<LinkHandle>,
}

impl Console {
    fn new(cfg: Config, handle: LinkHandle) -> Self {
        Self {
            cfg,
            motion: MotionPad::new(handle.clone()),
            camera: CameraPad::new(handle.clone()),
            lights: LightPanel::new(handle.clone()),
            servos: ServoPanel::new(handle.clone()),
            handle,
        }
    }

    async fn dispatch(&mut self, line: &str) -> Flow {
        if line.is_empty() {
            return Flow::Continue;
        }
        let parts: Vec<&str> = line.split_whitespace().collect();
        match parts.as_slice() {
            ["help"] => cmd_help(),
            ["status"] => self.cmd_status(),
            ["video"] => println!("  Video feed: {}", self.cfg.video_feed_url().bold()),
            ["quit"] | ["exit"] => return Flow::Quit,

            // ── Movement (w/a/s/d are the classic key aliases) ───────────
            ["fwd"] | ["w"] => report_start(self.motion.drive(DriveDirection::Forward).await),
            ["back"] | ["s"] => report_start(self.motion.drive(DriveDirection::Backward).await),
            ["left"] | ["a"] => report_start(self.motion.turn(TurnDirection::Left).await),
            ["right"] | ["d"] => report_start(self.motion.turn(TurnDirection::Right).await),
            ["stop"] => report(self.motion.stop_all().await),

            // ── Camera (i/j/k/l aliases) ─────────────────────────────────
            ["look", "up"] | ["i"] => report_start(self.camera.tilt(TiltDirection::Up).await),
            ["look", "down"] | ["k"] => report_start(self.camera.tilt(TiltDirection::Down).await),
            ["look", "left"] | ["j"] => report_start(self.camera.pan(PanDirection::Left).await),
            ["look", "right"] | ["l"] => report_start(self.camera.pan(PanDirection::Right).await),
            ["look", "stop"] => {
                let tilt = self.camera.stop_tilt().await;
                let pan = self.camera.stop_pan().await;
                report(tilt.and(pan));
            }
            ["home"] | ["h"] => report(self.camera.home().await),

            // ── Lights ───────────────────────────────────────────────────
            ["light", "breath", r, g, b] => {
                match (r.parse::<u8>(), g.parse::<u8>(), b.parse::<u8>()) {
                    (Ok(r), Ok(g), Ok(b)) => {
                        report(self.lights.activate(LightMode::Breath { r, g, b }).await);
                    }
                    _ => println!("  {}", "Usage: light breath <r> <g> <b>  (0-255)".yellow()),
                }
            }
            ["light", "rainbow"] => report(self.lights.activate(LightMode::Rainbow).await),
            ["light", "police"] => report(self.lights.activate(LightMode::Police).await),
            ["light", "stars"] => report(self.lights.activate(LightMode::Stars).await),
            ["light", "off"] => report(self.lights.off().await),

            // ── Servo calibration ────────────────────────────────────────
            ["servo", "list"] => self.cmd_servo_list(),
            ["servo", "toggle", id] => match id.parse::<u8>() {
                Ok(id) => match self.servos.toggle(id) {
                    Ok(selected) => self.print_selection_change(selected),
                    Err(e) => println!("  {}: {}", "Servo error".red(), e),
                },
                Err(_) => println!("  {}", "Usage: servo toggle <id>".yellow()),
            },
            ["servo", "group", tag] => match LegGroup::from_tag(tag) {
                Some(group) => {
                    self.servos.toggle_group(group);
                    self.print_selection_summary();
                }
                None => println!(
                    "  {} '{}'.  Groups: left_I..left_III, right_I..right_III, camera.",
                    "Unknown group:".red(),
                    tag.yellow()
                ),
            },
            ["servo", "legs"] => {
                self.servos.toggle_all_legs();
                self.print_selection_summary();
            }
            ["servo", "clear"] => {
                self.servos.clear();
                self.print_selection_summary();
            }
            ["servo", "set", dir, steps] => {
                let direction = match *dir {
                    "+" => Some(StepDirection::Increase),
                    "-" => Some(StepDirection::Decrease),
                    _ => None,
                };
                match (direction, steps.parse::<u8>()) {
                    (Some(direction), Ok(steps)) => {
                        self.cmd_servo_apply(ServoOp::Set { direction, steps }).await;
                    }
                    _ => println!("  {}", "Usage: servo set +|- <steps>".yellow()),
                }
            }
            ["servo", "save"] => self.cmd_servo_apply(ServoOp::Save).await,
            ["servo", "center"] => self.cmd_servo_apply(ServoOp::Center).await,
            ["servo", "reset"] => self.cmd_servo_apply(ServoOp::Reset).await,

            other => {
                println!(
                    "{} '{}'. Type {} for available commands.",
                    "Unknown command:".red(),
                    other.join(" ").yellow(),
                    "help".bold()
                );
            }
        }
        Flow::Continue
    }

    /// Halt both movement axes and the camera. Errors are ignored: there
    /// is nothing better to do with them on the way out.
    async fn halt(&mut self) {
        let _ = self.motion.stop_all().await;
        let _ = self.camera.stop_tilt().await;
        let _ = self.camera.stop_pan().await;
    }

    async fn close(self) {
        self.handle.shutdown().await;
    }

    // ── Command handlers ─────────────────────────────────────────────────

    fn cmd_status(&self) {
        let state = self.handle.state();
        let label = state.describe();
        let coloured = match state {
            LinkState::Connected => label.green(),
            LinkState::Connecting | LinkState::Authenticating => label.yellow(),
            _ => label.red(),
        };
        println!();
        println!("  Link     : {}", coloured.bold());

        match self.handle.telemetry() {
            Some(snap) => {
                for (spec, value) in METRICS.iter().zip(snap.values()) {
                    let text = format!("{:.1}{}", value, spec.unit);
                    let coloured = match spec.classify(value) {
                        MetricLevel::Nominal => text.green(),
                        MetricLevel::Warning => text.yellow(),
                        MetricLevel::Danger => text.red().bold(),
                    };
                    println!("  {:<9}: {}", spec.label, coloured);
                }
                println!(
                    "  Updated  : {}",
                    snap.received_at.format("%H:%M:%S UTC").to_string().dimmed()
                );
            }
            None => println!("  {}", "No telemetry received yet.".dimmed()),
        }
        println!("  Video    : {}", self.cfg.video_feed_url());
        println!();
    }

    fn cmd_servo_list(&self) {
        println!();
        println!("{}", "Servo Catalog".bold().underline());
        let mut current_group = None;
        for servo in SERVOS.iter() {
            if current_group != Some(servo.group) {
                current_group = Some(servo.group);
                let marker = if self.servos.is_group_selected(servo.group) {
                    "▣".green()
                } else {
                    "▢".normal()
                };
                println!("  {} {}", marker, servo.group.to_string().bold());
            }
            let marker = if self.servos.is_selected(servo.id) {
                "[x]".green()
            } else {
                "[ ]".normal()
            };
            println!("    {} {:>2}  {}", marker, servo.id, servo.name);
        }
        println!();
    }

    async fn cmd_servo_apply(&mut self, op: ServoOp) {
        match self.servos.apply(op).await {
            Ok(reply) => print_reply(&reply),
            Err(e) => println!("  {}: {}", "Servo error".red(), e),
        }
    }

    fn print_selection_change(&self, selected: bool) {
        let action = if selected { "selected".green() } else { "deselected".yellow() };
        println!("  Servo {}; {} now selected.", action, self.servos.selected().len());
    }

    fn print_selection_summary(&self) {
        println!("  {} servo(s) selected.", self.servos.selected().len());
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn cmd_help() {
    println!();
    println!("{}", "Hexpilot Commands".bold().underline());
    println!("  {}                       – link state, telemetry, video URL", "status".bold().cyan());
    println!("  {}   – movement (aliases w/s/a/d; {} releases)", "fwd  back  left  right".bold().cyan(), "stop".bold());
    println!("  {} – camera (aliases i/k/j/l; {} releases)", "look up|down|left|right".bold().cyan(), "look stop".bold());
    println!("  {}                         – re-centre the camera mount", "home".bold().cyan());
    println!("  {}  – LED modes", "light breath|rainbow|police|stars|off".bold().cyan());
    println!("  {}  – calibration selection", "servo list|toggle|group|legs|clear".bold().cyan());
    println!("  {}   – batch operations", "servo set|save|center|reset".bold().cyan());
    println!("  {}                        – print the video feed URL", "video".bold().cyan());
    println!("  {}                  – halt the robot and leave", "quit  exit".bold().cyan());
    println!();
}

fn print_reply(reply: &Reply) {
    match reply.status {
        ReplyStatus::Ok => {
            if let Some(positions) = &reply.positions {
                println!("  {}", "Positions:".bold());
                for (id, position) in positions {
                    println!("    servo {:>2} → {}", id, position);
                }
            } else {
                println!("  {}", "OK".green());
            }
        }
        ReplyStatus::Error => {
            let message = reply.message.as_deref().unwrap_or("controller reported an error");
            println!("  {}: {}", "Controller error".red(), message);
        }
    }
}

fn report_start(result: Result<bool, LinkError>) {
    match result {
        Ok(true) => {}
        Ok(false) => println!("  {}", "(already held)".dimmed()),
        Err(e) => println!("  {}: {}", "Command failed".red(), e),
    }
}

fn report(result: Result<(), LinkError>) {
    if let Err(e) = result {
        println!("  {}: {}", "Command failed".red(), e);
    }
}
