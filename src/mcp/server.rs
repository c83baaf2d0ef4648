//! MCP server: session lifecycle and the footprint tools.
//!
//! Lifecycle:
//!
//! 1. `initialize` request, answered with capabilities and server info;
//! 2. `notifications/initialized`, after which tools may be listed and called;
//! 3. end of input or a termination signal.
//!
//! The server keeps one thermal tab and one D-shape pad generator per
//! session. Tool arguments are partial property sets: fields a call leaves
//! out keep the values from earlier calls.

use std::f64::consts::{FRAC_PI_2, TAU};

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncWrite};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::geometry::{Arc, Segment};
use crate::mcp::protocol::{
    parse_message, IncomingMessage, JsonRpcError, JsonRpcNotification, JsonRpcRequest,
    JsonRpcResponse, RequestId, MCP_PROTOCOL_VERSION, SERVER_NAME,
};
use crate::mcp::transport::{StdioTransport, Transport};
use crate::pads::{DShapePad, PropertyBag, ThermalTab, ThermalTabGeometry};
use crate::pattern::density::DensityLevel;
use crate::pattern::{MaskState, PadProperties, PadStack, PasteState, Pattern, TerminalShape};
use crate::render::{composite_path_data, path_data};

/// Where the session is in the MCP lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    /// No `initialize` yet.
    AwaitingInit,
    /// `initialize` answered, waiting for `notifications/initialized`.
    Initialising,
    /// Serving tools.
    Running,
    /// Input closed or a signal arrived.
    ShuttingDown,
}

/// Capabilities sent in the `initialize` result.
#[derive(Debug, Clone, Serialize)]
pub struct ServerCapabilities {
    /// Tool support.
    pub tools: ToolCapabilities,
}

/// Tool capability flags.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ToolCapabilities {
    /// The tool list is fixed, so this is always `false` and omitted.
    #[serde(rename = "listChanged", skip_serializing_if = "is_false")]
    pub list_changed: bool,
}

// serde's skip_serializing_if passes a reference
#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_false(b: &bool) -> bool {
    !*b
}

/// `serverInfo` in the `initialize` result.
#[derive(Debug, Clone, Serialize)]
pub struct ServerInfo {
    /// Server name.
    pub name: &'static str,
    /// Crate version.
    pub version: &'static str,
}

impl Default for ServerInfo {
    fn default() -> Self {
        Self {
            name: SERVER_NAME,
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}

/// Client identity from `initialize`.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientInfo {
    /// Client name.
    pub name: String,
    /// Client version.
    #[serde(default)]
    pub version: Option<String>,
}

/// `initialize` parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    /// Revision the client speaks.
    pub protocol_version: String,
    /// Client capabilities, unused.
    #[serde(default)]
    pub capabilities: Value,
    /// Client identity.
    #[serde(default)]
    pub client_info: Option<ClientInfo>,
}

/// Entry in the `tools/list` result.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    /// Tool name.
    pub name: &'static str,
    /// What the tool does.
    pub description: &'static str,
    /// JSON schema of the arguments.
    pub input_schema: Value,
}

/// `tools/call` parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCallParams {
    /// Tool name.
    pub name: String,
    /// Tool arguments.
    #[serde(default)]
    pub arguments: Value,
}

/// Content block of a tool result.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolContent {
    /// Plain text, here always a JSON document.
    Text {
        /// Content.
        text: String,
    },
}

/// `tools/call` result.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallResult {
    /// Output blocks.
    pub content: Vec<ToolContent>,
    /// Set when the tool rejected the call.
    #[serde(skip_serializing_if = "is_false")]
    pub is_error: bool,
}

impl ToolCallResult {
    /// Successful result.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text { text: text.into() }],
            is_error: false,
        }
    }

    /// Failed result.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text {
                text: message.into(),
            }],
            is_error: true,
        }
    }

    fn json(value: &Value) -> Self {
        match serde_json::to_string_pretty(value) {
            Ok(text) => Self::text(text),
            Err(e) => Self::error(format!("failed to encode result: {e}")),
        }
    }
}

/// Reply to one request.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Success.
    Response(JsonRpcResponse),
    /// Failure.
    Error(JsonRpcError),
}

impl From<Result<JsonRpcResponse, JsonRpcError>> for Reply {
    fn from(result: Result<JsonRpcResponse, JsonRpcError>) -> Self {
        match result {
            Ok(r) => Self::Response(r),
            Err(e) => Self::Error(e),
        }
    }
}

/// Footprint tool server.
pub struct McpServer {
    state: ServerState,
    protocol_version: Option<String>,
    thermal_tab: ThermalTab,
    d_pad: DShapePad,
    thermal_tab_defaults: Value,
    d_pad_defaults: Value,
    include_svg: bool,
}

impl Default for McpServer {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl McpServer {
    /// Creates a server whose generators start from the configured defaults.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        let mut server = Self {
            state: ServerState::AwaitingInit,
            protocol_version: None,
            thermal_tab: ThermalTab::new(),
            d_pad: DShapePad::new(),
            thermal_tab_defaults: config.defaults.thermal_tab.clone(),
            d_pad_defaults: config.defaults.d_pad.clone(),
            include_svg: config.render.include_svg,
        };
        server.reset_thermal_tab();
        server.reset_d_pad();
        server
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> ServerState {
        self.state
    }

    /// Negotiated protocol revision, once initialised.
    #[must_use]
    pub fn protocol_version(&self) -> Option<&str> {
        self.protocol_version.as_deref()
    }

    /// Session thermal tab generator.
    #[must_use]
    pub const fn thermal_tab(&self) -> &ThermalTab {
        &self.thermal_tab
    }

    /// Session D-shape pad generator.
    #[must_use]
    pub const fn d_pad(&self) -> &DShapePad {
        &self.d_pad
    }

    /// Serves stdin/stdout until end of input or SIGINT/SIGTERM (Ctrl+C on
    /// Windows).
    ///
    /// # Errors
    ///
    /// Transport I/O failures.
    pub async fn run(&mut self) -> std::io::Result<()> {
        let mut transport = StdioTransport::stdio();
        self.run_with_shutdown(&mut transport).await
    }

    #[cfg(unix)]
    async fn run_with_shutdown(&mut self, transport: &mut StdioTransport) -> std::io::Result<()> {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigint = signal(SignalKind::interrupt())?;
        let mut sigterm = signal(SignalKind::terminate())?;

        let outcome = tokio::select! {
            result = self.serve(transport) => Some(result),
            _ = sigint.recv() => None,
            _ = sigterm.recv() => None,
        };
        outcome.unwrap_or_else(|| {
            info!("termination signal received, shutting down");
            self.state = ServerState::ShuttingDown;
            Ok(())
        })
    }

    #[cfg(not(unix))]
    async fn run_with_shutdown(&mut self, transport: &mut StdioTransport) -> std::io::Result<()> {
        let outcome = tokio::select! {
            result = self.serve(transport) => Some(result),
            _ = tokio::signal::ctrl_c() => None,
        };
        outcome.unwrap_or_else(|| {
            info!("Ctrl+C received, shutting down");
            self.state = ServerState::ShuttingDown;
            Ok(())
        })
    }

    /// Reads messages from `transport` and answers them until end of input.
    ///
    /// # Errors
    ///
    /// Transport I/O failures.
    pub async fn serve<R, W>(&mut self, transport: &mut Transport<R, W>) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        while let Some(line) = transport.read_line().await? {
            match self.handle_line(&line) {
                Some(Reply::Response(r)) => transport.write_response(&r).await?,
                Some(Reply::Error(e)) => transport.write_error(&e).await?,
                None => {}
            }
        }
        debug!("input closed");
        self.state = ServerState::ShuttingDown;
        Ok(())
    }

    /// Handles one input line. Returns `None` when nothing is to be sent:
    /// blank lines and notifications.
    pub fn handle_line(&mut self, line: &str) -> Option<Reply> {
        if line.trim().is_empty() {
            return None;
        }
        match parse_message(line) {
            Ok(IncomingMessage::Request(req)) => Some(self.handle_request(&req).into()),
            Ok(IncomingMessage::Notification(n)) => {
                self.handle_notification(&n);
                None
            }
            Err(e) => {
                warn!(code = e.error.code, "rejected malformed message");
                Some(Reply::Error(e))
            }
        }
    }

    fn handle_request(&mut self, req: &JsonRpcRequest) -> Result<JsonRpcResponse, JsonRpcError> {
        debug!(id = %req.id, method = %req.method, "request");
        match req.method.as_str() {
            "initialize" => self.handle_initialize(req),
            "tools/list" => self.handle_tools_list(req),
            "tools/call" => self.handle_tools_call(req),
            "ping" => Ok(JsonRpcResponse::success(req.id.clone(), json!({}))),
            other => Err(JsonRpcError::method_not_found(req.id.clone(), other)),
        }
    }

    fn handle_notification(&mut self, n: &JsonRpcNotification) {
        match n.method.as_str() {
            "notifications/initialized" if self.state == ServerState::Initialising => {
                info!("client ready");
                self.state = ServerState::Running;
            }
            other => debug!(method = other, "notification ignored"),
        }
    }

    fn handle_initialize(&mut self, req: &JsonRpcRequest) -> Result<JsonRpcResponse, JsonRpcError> {
        if self.state != ServerState::AwaitingInit {
            return Err(JsonRpcError::invalid_state(
                req.id.clone(),
                "Server already initialised",
            ));
        }
        let params: InitializeParams = parse_params(req, "initialize")?;
        if params.protocol_version != MCP_PROTOCOL_VERSION {
            debug!(
                requested = %params.protocol_version,
                offered = MCP_PROTOCOL_VERSION,
                "protocol version differs"
            );
        }
        if let Some(client) = &params.client_info {
            info!(client = %client.name, version = ?client.version, "initialize");
        }

        self.protocol_version = Some(MCP_PROTOCOL_VERSION.to_string());
        self.state = ServerState::Initialising;

        Ok(JsonRpcResponse::success(
            req.id.clone(),
            json!({
                "protocolVersion": MCP_PROTOCOL_VERSION,
                "capabilities": ServerCapabilities {
                    tools: ToolCapabilities::default(),
                },
                "serverInfo": ServerInfo::default(),
            }),
        ))
    }

    fn handle_tools_list(&self, req: &JsonRpcRequest) -> Result<JsonRpcResponse, JsonRpcError> {
        self.require_running(&req.id)?;
        Ok(JsonRpcResponse::success(
            req.id.clone(),
            json!({ "tools": tool_definitions() }),
        ))
    }

    fn handle_tools_call(&mut self, req: &JsonRpcRequest) -> Result<JsonRpcResponse, JsonRpcError> {
        self.require_running(&req.id)?;
        let params: ToolCallParams = parse_params(req, "tools/call")?;
        debug!(tool = %params.name, "tool call");

        let result = match params.name.as_str() {
            "thermal_tab" => self.call_thermal_tab(&params.arguments),
            "d_pad" => self.call_d_pad(&params.arguments),
            "qfn_pattern" => self.call_qfn_pattern(&params.arguments),
            other => ToolCallResult::error(format!("Unknown tool: {other}")),
        };

        let value = serde_json::to_value(&result).map_err(|e| {
            tracing::error!(error = %e, "failed to encode tool result");
            JsonRpcError::internal_error(req.id.clone(), "failed to encode tool result")
        })?;
        Ok(JsonRpcResponse::success(req.id.clone(), value))
    }

    fn require_running(&self, id: &RequestId) -> Result<(), JsonRpcError> {
        if self.state == ServerState::Running {
            Ok(())
        } else {
            Err(JsonRpcError::invalid_state(id.clone(), "Server not initialised"))
        }
    }

    fn reset_thermal_tab(&mut self) {
        self.thermal_tab = ThermalTab::new();
        self.thermal_tab.set_props(&self.thermal_tab_defaults);
    }

    fn reset_d_pad(&mut self) {
        self.d_pad = DShapePad::new();
        self.d_pad.set_props(&self.d_pad_defaults);
    }

    fn call_thermal_tab(&mut self, args: &Value) -> ToolCallResult {
        if let Err(message) = check_arguments(args) {
            return ToolCallResult::error(message);
        }
        if PropertyBag::new(args).flag("reset") == Some(true) {
            self.reset_thermal_tab();
        }
        self.thermal_tab.set_props(args);

        let geometry = self.thermal_tab.generate();
        let mut out = match serde_json::to_value(&geometry) {
            Ok(v) => v,
            Err(e) => return ToolCallResult::error(format!("failed to encode geometry: {e}")),
        };
        if self.include_svg {
            out["svg"] = thermal_tab_svg(&geometry);
        }
        ToolCallResult::json(&out)
    }

    fn call_d_pad(&mut self, args: &Value) -> ToolCallResult {
        if let Err(message) = check_arguments(args) {
            return ToolCallResult::error(message);
        }
        if PropertyBag::new(args).flag("reset") == Some(true) {
            self.reset_d_pad();
        }
        let props = self.d_pad.set_props(args);
        let outlines = self.d_pad.outlines();

        let mut out = json!({ "props": props, "outlines": outlines });
        if self.include_svg {
            out["svg"] = json!({
                "pad": path_data(&outlines.pad),
                "solderMask": path_data(&outlines.solder_mask),
                "pasteMask": path_data(&outlines.paste_mask),
            });
        }
        ToolCallResult::json(&out)
    }

    fn call_qfn_pattern(&self, args: &Value) -> ToolCallResult {
        if let Err(message) = check_arguments(args) {
            return ToolCallResult::error(message);
        }
        let bag = PropertyBag::new(args);
        let mut pattern = Pattern::new_qfn(bag.text("name"));

        let density = match bag.text("density") {
            Some(text) => match DensityLevel::from_str_loose(text) {
                Some(level) => Some(level),
                None => return ToolCallResult::error("density must be one of M, N or L"),
            },
            None => None,
        };

        // the session pad, re-seeded from the fillet goals when a density is given
        let mut d_pad = self.d_pad.clone();
        let d = *d_pad.props();
        pattern.props.term_length = d.term_length;
        pattern.props.term_width = d.term_width;
        pattern.props.jt = d.pad_toe;
        pattern.props.jh = d.pad_heel;
        pattern.props.js = d.pad_side;
        if let Some(level) = density {
            pattern.props.apply_fillet_goals(pattern.fillet_goals(level));
            d_pad.set_props(&pattern.props.d_shape_update());
            debug!(density = %level, props = ?d_pad.props(), "terminal seeded from fillet goals");
        }

        let d = d_pad.props();
        let d_uid = pattern.add_template(
            "D-shape terminal",
            TerminalShape::DShape,
            PadProperties {
                pad_width: d.term_width,
                pad_length: d.right_edge(),
                ..PadProperties::default()
            },
            PadStack::from_d_shape(&d_pad.outlines()),
        );

        let tab = self.thermal_tab.generate();
        let tab_uid = pattern.add_template(
            "Thermal tab",
            TerminalShape::Irregular,
            PadProperties {
                pad_width: tab.props.pad_width,
                pad_length: tab.props.pad_length,
                top_mask_state: MaskState::Open,
                top_paste_state: PasteState::Solder,
                ..PadProperties::default()
            },
            PadStack::from_thermal_tab(&tab),
        );
        pattern.add_pad(tab_uid, 0.0, 0.0, 0.0);

        // the exposed pad follows the perimeter pins unless told otherwise
        let first = match bag.number("renumber_from") {
            Some(n) if n >= 1.0 && n <= f64::from(u32::MAX) => {
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let n = n.round() as u32;
                n
            }
            Some(_) => return ToolCallResult::error("renumber_from must be a positive integer"),
            None => pattern.props.pin_count + 1,
        };
        pattern.renumber_pins(first);

        let ipc_name = pattern.ipc_name(density.unwrap_or_default(), true);
        debug!(d_template = d_uid, tab_template = tab_uid, %ipc_name, "pattern built");
        ToolCallResult::json(&json!({ "ipcName": ipc_name, "pattern": pattern }))
    }
}

fn parse_params<T>(req: &JsonRpcRequest, method: &str) -> Result<T, JsonRpcError>
where
    T: for<'de> Deserialize<'de>,
{
    let Some(params) = req.params.clone() else {
        return Err(JsonRpcError::invalid_params(
            req.id.clone(),
            format!("{method}: missing params"),
        ));
    };
    serde_json::from_value(params)
        .map_err(|e| JsonRpcError::invalid_params(req.id.clone(), format!("{method}: {e}")))
}

fn check_arguments(args: &Value) -> Result<(), String> {
    if args.is_null() || args.is_object() {
        Ok(())
    } else {
        Err("arguments must be an object".to_string())
    }
}

fn thermal_tab_svg(tab: &ThermalTabGeometry) -> Value {
    let (hl, hw) = (tab.props.pad_length / 2.0, tab.props.pad_width / 2.0);
    let pad = Segment::from_pairs(&[(-hl, hw), (hl, hw), (hl, -hw), (-hl, -hw)]);
    let radius = tab.props.via_diameter / 2.0;
    let vias: Vec<Segment> = tab
        .via_positions
        .iter()
        .map(|&c| {
            Arc::sweep(c, radius, FRAC_PI_2, FRAC_PI_2 - TAU)
                .open_end()
                .tessellate()
        })
        .collect();
    json!({
        "pad": path_data(&pad),
        "solderMask": composite_path_data(&tab.solder_masks),
        "pasteMask": composite_path_data(&tab.paste_masks),
        "vias": composite_path_data(&vias),
    })
}

#[allow(clippy::too_many_lines)]
fn tool_definitions() -> Vec<ToolDefinition> {
    let number = |description: &str| json!({ "type": "number", "description": description });
    vec![
        ToolDefinition {
            name: "thermal_tab",
            description: "Generate the exposed thermal pad of a QFN package: via grid, \
                          solder-mask openings and paste apertures that avoid the vias. \
                          Arguments are a partial property set; fields left out keep their \
                          values from earlier calls. Out-of-range values are clamped. \
                          Lengths in millimetres, y up.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "padLength": number("Pad size along x, 1..100"),
                    "padWidth": number("Pad size along y, 1..100"),
                    "maskSwell": number("Mask opening growth, 0..1"),
                    "pasteShrink": number("Paste inset from copper and vias, 0..0.5"),
                    "pasteSpacing": number("Gap between neighbouring paste apertures"),
                    "viaDiameter": number("Drill diameter, 0.1..0.5"),
                    "viaRingWidth": number("Annular ring width, 0.015..1"),
                    "viaPitchH": number("Horizontal via pitch, 0.1 grid"),
                    "viaPitchV": number("Vertical via pitch, 0.1 grid"),
                    "viaTenting": { "type": "boolean", "description": "Cover vias with mask" },
                    "viaLayout": { "type": "string", "enum": ["grid", "dense"] },
                    "reset": { "type": "boolean", "description": "Start from the defaults" }
                }
            }),
        },
        ToolDefinition {
            name: "d_pad",
            description: "Generate a D-shape terminal pad with its solder-mask and paste \
                          outlines. Partial updates as for thermal_tab.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "termLength": number("Terminal length, 0.1..10"),
                    "termWidth": number("Terminal width, 0.1..10"),
                    "padToe": number("Toe extension, 0..2"),
                    "padHeel": number("Heel extension, 0..2"),
                    "padSide": number("Side inset, 0..termWidth/4"),
                    "maskSwell": number("Mask opening growth, 0..1"),
                    "pasteShrink": number("Paste inset"),
                    "reset": { "type": "boolean", "description": "Start from the defaults" }
                }
            }),
        },
        ToolDefinition {
            name: "qfn_pattern",
            description: "Build a QFN footprint pattern holding the current D-shape pad and \
                          thermal tab as templates, with the exposed pad placed at the origin. \
                          Returns the pattern and its IPC-7351 name.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "name": { "type": "string", "description": "Pattern name" },
                    "renumber_from": {
                        "type": "integer",
                        "minimum": 1,
                        "description": "First pin number (default: pin count + 1)"
                    },
                    "density": {
                        "type": "string",
                        "enum": ["M", "N", "L"],
                        "description": "IPC-7351 density level. Seeds the terminal toe, heel \
                                        and side from the fillet goals and sets the name suffix \
                                        (default: current D-shape pad, N)"
                    }
                }
            }),
        },
    ]
}
