use std::sync::Arc;

use crate::adapters::{FfmpegAdapter, FsLocalAdapter};
use crate::app::encode_interactor::EncodeInteractor;
use crate::config_initialization::Settings;
use crate::ports::{FsPort, TranscoderPort};

pub trait AppContainer: Send + Sync {
    fn encode_interactor(&self) -> Arc<EncodeInteractor>;
}

/// Wires the production adapters together
pub struct DefaultAppContainer {
    encode_interactor: Arc<EncodeInteractor>,
}

impl DefaultAppContainer {
    pub fn new(settings: &Settings, verbose: bool) -> Self {
        let fs_port = Arc::new(FsLocalAdapter::new());
        let transcoder_port = Arc::new(FfmpegAdapter::new(settings.ffmpeg.clone(), verbose));

        let encode_interactor = Arc::new(EncodeInteractor::new(
            fs_port as Arc<dyn FsPort>,
            transcoder_port as Arc<dyn TranscoderPort>,
        ));

        Self { encode_interactor }
    }
}

impl AppContainer for DefaultAppContainer {
    fn encode_interactor(&self) -> Arc<EncodeInteractor> {
        Arc::clone(&self.encode_interactor)
    }
}
