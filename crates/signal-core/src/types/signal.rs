//! Protocol signal names carried in the `sig` field.

wire_enum! {
    /// Every signal the dispatch server and this client exchange.
    ///
    /// Client-originated requests (`create`, `grab`, `groupopt`, ...) and
    /// server-originated notifications (`newpeer`, `joinstate`, `updateopt`, ...)
    /// share one namespace, so the dispatcher matches on this enum directly.
    pub enum SignalType: "signal" {
        Connect => "connect",
        ConnectAck => "connectack",
        Disconnect => "disconnect",
        DisconnectAck => "disconnectack",
        Create => "create",
        CreateAck => "createack",
        NewPeer => "newpeer",
        Leave => "leave",
        LeaveAck => "leaveack",
        Reject => "reject",
        Accept => "accept",
        Destroy => "destroy",
        Ring => "ring",
        Cancel => "cancel",
        Offer => "offer",
        OfferAck => "offerack",
        Answer => "answer",
        JoinFinish => "joinfinish",
        Publish => "publish",
        Grab => "grab",
        GrabAck => "graback",
        /// Floor granted: the server unmuted the requester
        Unmute => "unmute",
        Free => "free",
        FreeAck => "freeack",
        /// Floor released: the server muted the releaser
        Mute => "mute",
        JoinState => "joinstate",
        Monitor => "monitor",
        MonitorAck => "monitorack",
        Message => "message",
        CallOpt => "callopt",
        GroupOpt => "groupopt",
        UpdateOpt => "updateopt",
        NotifyWeb => "notifyweb",
    }
}
