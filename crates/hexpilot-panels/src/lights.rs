use hexpilot_link::LinkError;
use hexpilot_types::Command;
use tracing::debug;

use crate::CommandSink;

/// One of the LED strip's animated modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightMode {
    Breath { r: u8, g: u8, b: u8 },
    Rainbow,
    Police,
    Stars,
}

impl LightMode {
    fn command(self) -> Command {
        match self {
            LightMode::Breath { r, g, b } => Command::Breath { r, g, b },
            LightMode::Rainbow => Command::Rainbow,
            LightMode::Police => Command::Police,
            LightMode::Stars => Command::Stars,
        }
    }

    /// Same mode, parameters aside.
    fn same_kind(self, other: LightMode) -> bool {
        std::mem::discriminant(&self) == std::mem::discriminant(&other)
    }
}

/// Mode-exclusive light emitter.
///
/// Activating a mode while another is running emits `off` first, so the
/// controller never layers two animations. The one exception is a colour
/// change while breathing, which re-sends `breath` with the new colour and
/// keeps the mode running.
pub struct LightPanel<S> {
    sink: S,
    active: Option<LightMode>,
}

impl<S: CommandSink> LightPanel<S> {
    pub fn new(sink: S) -> Self {
        Self { sink, active: None }
    }

    pub fn active(&self) -> Option<LightMode> {
        self.active
    }

    /// Activate a mode, turning the previous one off first when a
    /// different mode is running.
    pub async fn activate(&mut self, mode: LightMode) -> Result<(), LinkError> {
        match self.active {
            Some(current) if current.same_kind(mode) => {
                if current == mode {
                    debug!(?mode, "mode already active");
                    return Ok(());
                }
                // Parameter change within the running mode, no off/on cycle.
                self.sink.send(mode.command()).await?;
            }
            Some(_) => {
                self.sink.send(Command::Off).await?;
                self.sink.send(mode.command()).await?;
            }
            None => {
                self.sink.send(mode.command()).await?;
            }
        }
        self.active = Some(mode);
        Ok(())
    }

    /// Turn the strip off.
    pub async fn off(&mut self) -> Result<(), LinkError> {
        self.active = None;
        self.sink.send(Command::Off).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingSink;

    #[tokio::test]
    async fn first_activation_skips_the_off_preamble() {
        let sink = RecordingSink::default();
        let mut panel = LightPanel::new(&sink);

        panel.activate(LightMode::Rainbow).await.unwrap();
        assert_eq!(sink.names(), vec!["rainbow"]);
        assert_eq!(panel.active(), Some(LightMode::Rainbow));
    }

    #[tokio::test]
    async fn switching_modes_turns_the_previous_one_off_first() {
        let sink = RecordingSink::default();
        let mut panel = LightPanel::new(&sink);

        panel.activate(LightMode::Rainbow).await.unwrap();
        panel.activate(LightMode::Police).await.unwrap();

        assert_eq!(sink.names(), vec!["rainbow", "off", "police"]);
    }

    #[tokio::test]
    async fn breath_colour_change_resends_without_mode_cycle() {
        let sink = RecordingSink::default();
        let mut panel = LightPanel::new(&sink);

        panel.activate(LightMode::Breath { r: 255, g: 0, b: 0 }).await.unwrap();
        panel.activate(LightMode::Breath { r: 0, g: 0, b: 255 }).await.unwrap();

        assert_eq!(
            sink.commands(),
            vec![
                Command::Breath { r: 255, g: 0, b: 0 },
                Command::Breath { r: 0, g: 0, b: 255 },
            ]
        );
        assert_eq!(panel.active(), Some(LightMode::Breath { r: 0, g: 0, b: 255 }));
    }

    #[tokio::test]
    async fn reactivating_the_running_mode_is_a_no_op() {
        let sink = RecordingSink::default();
        let mut panel = LightPanel::new(&sink);

        panel.activate(LightMode::Stars).await.unwrap();
        panel.activate(LightMode::Stars).await.unwrap();

        assert_eq!(sink.names(), vec!["stars"]);
    }

    #[tokio::test]
    async fn off_clears_the_active_mode() {
        let sink = RecordingSink::default();
        let mut panel = LightPanel::new(&sink);

        panel.activate(LightMode::Police).await.unwrap();
        panel.off().await.unwrap();
        assert_eq!(panel.active(), None);

        // The next activation is treated as a cold start.
        panel.activate(LightMode::Rainbow).await.unwrap();
        assert_eq!(sink.names(), vec!["police", "off", "rainbow"]);
    }
}
