/// Tags of the requests a client can send to the server.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum RequestType {
    // Opens a session; followed by a map with the login properties.
    Authenticate = 20,
    // Executes a batch of SQL statements; followed by the SQL text.
    Batch = 21,
    // Tells the server that the client is still alive.
    KeepAlive = 30,
    // Asks the server to abort the batch currently executing.
    // Sent out-of-band, without MessagePack framing.
    Cancel = 100,
}
