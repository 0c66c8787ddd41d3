use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Remote control command carried in `childMsgType` of a control message.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ChildMessageType {
    /// Start pushing a live stream
    StartStream,
    /// Start pushing a live stream and record it on the terminal
    StartStreamAndRecord,
    /// Terminal's answer to a stream start request
    StreamStartResponse,
    /// Stop pushing a live stream
    StopStream,
    /// Forward the live stream to another terminal
    ForwardStream,
    Quit,
    StartVideoRecord,
    StopVideoRecord,
    TakePhoto,
    RemoteZoom,
    RemoteZoomScale,
    ClearDisplay,
    Config,
    FaceRecognition,
    VehicleRecognition,
    FileQuery,
    SwitchCamera,
    Shutdown,
    Reboot,
    FileUpload,
    GroupMessage,
    Other(String),
}

impl ChildMessageType {
    pub fn as_str(&self) -> &str {
        match self {
            ChildMessageType::StartStream => "DaRtmpS",
            ChildMessageType::StartStreamAndRecord => "DaRecordAndMonitor",
            ChildMessageType::StreamStartResponse => "DaRtmpSResp",
            ChildMessageType::StopStream => "DaRtmpE",
            ChildMessageType::ForwardStream => "DaRtmpP",
            ChildMessageType::Quit => "DaQuit",
            ChildMessageType::StartVideoRecord => "DaVideoS",
            ChildMessageType::StopVideoRecord => "DaVideoE",
            ChildMessageType::TakePhoto => "DaPhotoS",
            ChildMessageType::RemoteZoom => "DaRemoteZoom",
            ChildMessageType::RemoteZoomScale => "DaRemoteZoomScale",
            ChildMessageType::ClearDisplay => "DpClear",
            ChildMessageType::Config => "GrConfig",
            ChildMessageType::FaceRecognition => "GrFace",
            ChildMessageType::VehicleRecognition => "GrVehicle",
            ChildMessageType::FileQuery => "DaFileQuery",
            ChildMessageType::SwitchCamera => "DaVideoCallCamera",
            ChildMessageType::Shutdown => "DaShutdown",
            ChildMessageType::Reboot => "DaReboot",
            ChildMessageType::FileUpload => "DaFileUpload",
            ChildMessageType::GroupMessage => "GrMessage",
            ChildMessageType::Other(raw) => raw,
        }
    }

    pub fn parse(raw: &str) -> ChildMessageType {
        match raw {
            "DaRtmpS" => ChildMessageType::StartStream,
            "DaRecordAndMonitor" => ChildMessageType::StartStreamAndRecord,
            "DaRtmpSResp" => ChildMessageType::StreamStartResponse,
            "DaRtmpE" => ChildMessageType::StopStream,
            "DaRtmpP" => ChildMessageType::ForwardStream,
            "DaQuit" => ChildMessageType::Quit,
            "DaVideoS" => ChildMessageType::StartVideoRecord,
            "DaVideoE" => ChildMessageType::StopVideoRecord,
            "DaPhotoS" => ChildMessageType::TakePhoto,
            "DaRemoteZoom" => ChildMessageType::RemoteZoom,
            "DaRemoteZoomScale" => ChildMessageType::RemoteZoomScale,
            "DpClear" => ChildMessageType::ClearDisplay,
            "GrConfig" => ChildMessageType::Config,
            "GrFace" => ChildMessageType::FaceRecognition,
            "GrVehicle" => ChildMessageType::VehicleRecognition,
            "DaFileQuery" => ChildMessageType::FileQuery,
            "DaVideoCallCamera" => ChildMessageType::SwitchCamera,
            "DaShutdown" => ChildMessageType::Shutdown,
            "DaReboot" => ChildMessageType::Reboot,
            "DaFileUpload" => ChildMessageType::FileUpload,
            "GrMessage" => ChildMessageType::GroupMessage,
            other => ChildMessageType::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ChildMessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ChildMessageType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ChildMessageType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(ChildMessageType::parse(&raw))
    }
}
