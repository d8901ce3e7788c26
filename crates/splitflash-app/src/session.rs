use std::sync::mpsc::{self, Receiver, TryRecvError};

use crate::App;
use crate::effect::Effect;
use crate::message::Msg;
use crate::model::{Model, ModelOptions};
use crate::runtime::{Dispatch, Runtime};
use crate::settings::Settings;

/// The dispatch side of a running orchestrator: the model, the executor for
/// its effects and the channel workers report on.
pub struct Session {
    model: Model,
    runtime: Runtime,
    receiver: Receiver<Msg>,
    startup: Vec<Effect>,
}

impl Session {
    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Issues the effects produced while initializing the model.
    pub fn start(&mut self) -> Dispatch {
        let startup = std::mem::take(&mut self.startup);
        self.runtime.dispatch(startup)
    }

    pub fn handle(&mut self, msg: Msg) -> Dispatch {
        let effects = self.model.update(msg);
        self.runtime.dispatch(effects)
    }

    /// Applies every worker message already queued, without blocking.
    pub fn drain(&mut self) -> Dispatch {
        loop {
            match self.receiver.try_recv() {
                Ok(msg) => {
                    if self.handle(msg) == Dispatch::Quit {
                        return Dispatch::Quit;
                    }
                }
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => {
                    return Dispatch::Continue;
                }
            }
        }
    }

    /// Blocks for the next worker message.
    pub fn recv_timeout(&self, timeout: std::time::Duration) -> Option<Msg> {
        self.receiver.recv_timeout(timeout).ok()
    }
}

impl App {
    pub fn start_session(&self, settings: &Settings) -> Session {
        let (sender, receiver) = mpsc::channel();
        let runtime = Runtime::new(settings, self.runner.clone(), sender);

        let scanned = runtime.scan();
        let device_status = runtime.check_device();
        let (model, startup) = Model::init(
            ModelOptions {
                build_target: settings.build_target.clone(),
                volume_path: settings.volume_path.clone(),
            },
            scanned,
            device_status,
        );

        Session {
            model,
            runtime,
            receiver,
            startup,
        }
    }
}
