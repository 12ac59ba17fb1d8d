use core::fmt::{self, Write};


/// terminator closing every command frame sent to the instrument
pub const TERMINATOR: u8 = b'\r';
/// largest frame this driver will ever encode, enough for any `f32` parameter
pub const MAX_FRAME: usize = 64;

/// encoded command, ready to be written on the link
pub type Frame = heapless::Vec<u8, MAX_FRAME>;


/// two-letter ASCII command code recognized by the instrument
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Mnemonic([u8; 2]);

impl Mnemonic {
    pub const fn new(code: [u8; 2]) -> Self {
        Self(code)
    }
    pub const fn code(&self) -> [u8; 2] {self.0}
    pub fn as_str(&self) -> &str {
        core::str::from_utf8(&self.0).unwrap_or("??")
    }
}
impl fmt::Debug for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
impl fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// filament emission current, in mA
pub const FILAMENT: Mnemonic = Mnemonic(*b"FL");
/// noise floor setting, trades scan speed against sensitivity
pub const NOISE_FLOOR: Mnemonic = Mnemonic(*b"NF");
/// calibrate all detectors at the current noise floor
pub const CALIBRATE_ALL: Mnemonic = Mnemonic(*b"CA");
/// single mass measurement, answered by a 4 bytes binary current
pub const MASS_READING: Mnemonic = Mnemonic(*b"MR");
/// total pressure measurement
pub const TOTAL_PRESSURE: Mnemonic = Mnemonic(*b"TP");

/// commands echoing a status byte when they are not queries
pub const STATUS_COMMANDS: [Mnemonic; 3] = [FILAMENT, NOISE_FLOOR, CALIBRATE_ALL];


/// argument appended to a mnemonic
#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub enum Parameter {
    /// bare command
    #[default]
    None,
    /// `?`, asking the instrument for the current value instead of setting it
    Query,
    Integer(i32),
    /// sent with 2 decimals
    Decimal(f32),
}

/// a command as sent to the instrument
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Command {
    pub mnemonic: Mnemonic,
    pub parameter: Parameter,
}
impl Command {
    pub const fn new(mnemonic: Mnemonic, parameter: Parameter) -> Self {
        Self {mnemonic, parameter}
    }
    pub const fn is_query(&self) -> bool {
        matches!(self.parameter, Parameter::Query)
    }
    /** 
        whether the instrument echoes a status byte after this command
        
        a query is answered by a value line instead, so it never reports a status
    */
    pub fn reports_status(&self, status_commands: &[Mnemonic]) -> bool {
        ! self.is_query() && status_commands.contains(&self.mnemonic)
    }
    /// `MNEMONIC[PARAM]\r`
    pub fn frame(&self) -> Result<Frame, fmt::Error> {
        let mut text = heapless::String::<MAX_FRAME>::new();
        text.push_str(self.mnemonic.as_str()).map_err(|_| fmt::Error)?;
        match self.parameter {
            Parameter::None => {},
            Parameter::Query => text.push('?').map_err(|_| fmt::Error)?,
            Parameter::Integer(value) => write!(text, "{}", value)?,
            Parameter::Decimal(value) => write!(text, "{:.2}", value)?,
        }
        text.push(char::from(TERMINATOR)).map_err(|_| fmt::Error)?;
        Ok(text.into_bytes())
    }
}
