use crate::{
    config::ToneConfig,
    graph::node::GraphNode,
    voices,
};

/// Builds the graph each `PolySynth` voice renders.
///
/// Configure the sound once; the synth calls the factory for every slot in its
/// voice pool.
pub trait VoiceFactory {
    fn create_voice(&self) -> Box<dyn GraphNode>;
}

impl<F, T> VoiceFactory for F
where
    F: Fn() -> T,
    T: GraphNode + 'static,
{
    fn create_voice(&self) -> Box<dyn GraphNode> {
        Box::new(self())
    }
}

impl VoiceFactory for ToneConfig {
    fn create_voice(&self) -> Box<dyn GraphNode> {
        Box::new(voices::notepad(self))
    }
}
