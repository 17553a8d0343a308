#[derive(Debug)]
pub enum AppEvent {
    /// One line of user input
    Input(String),

    /// Input stream reached end of file
    InputClosed,

    /// Deferred demo-data initialization fired
    DemoDataReady,
}
