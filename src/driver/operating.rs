use log::*;

use crate::{
    command::{self, Mnemonic, Parameter},
    scan::ScanState,
    stream::Transport,
    };
use super::{Error, Rga};


/// margin absorbing float rounding at the edges of the filament tolerance window, far below the instrument's 0.01 mA resolution
const READBACK_MARGIN: f32 = 1e-4;


impl<T: Transport> Rga<T> {
    /// start-up check: the filament must be off and acknowledged so
    pub async fn begin(&mut self) -> Result<(), Error> {
        self.stream.flush()?;
        self.turn_filament_off().await
    }
    
    pub async fn set_noise_floor(&mut self, level: i32) -> Result<(), Error> {
        self.dispatch(command::NOISE_FLOOR, Parameter::Integer(level)).await?;
        self.discard_leftovers().await
    }
    
    pub async fn calibrate_all(&mut self) -> Result<(), Error> {
        self.dispatch(command::CALIBRATE_ALL, Parameter::None).await?;
        self.discard_leftovers().await
    }
    
    pub async fn turn_filament_off(&mut self) -> Result<(), Error> {
        self.set_filament(0.).await
    }
    /// switch the filament on at the given emission current in mA
    pub async fn turn_filament_on(&mut self, current: f32) -> Result<(), Error> {
        self.set_filament(current).await
    }
    /// command the filament current, then check the instrument reads it back within tolerance, edges included
    async fn set_filament(&mut self, current: f32) -> Result<(), Error> {
        self.dispatch(command::FILAMENT, Parameter::Decimal(current)).await?;
        let readback = self.query(command::FILAMENT).await?;
        if (readback - current).abs() > self.config.filament_tolerance + READBACK_MARGIN {
            warn!("filament commanded at {} but reads back {}", current, readback);
            return Err(Error::Verification {commanded: current, readback});
        }
        info!("filament current set to {}", readback);
        Ok(())
    }
    
    /// raw total pressure reading, not converted to any pressure unit
    pub async fn total_pressure(&mut self) -> Result<f32, Error> {
        self.query(command::TOTAL_PRESSURE).await
    }
    
    /// ask the current value of a setting, answered by an ASCII numeric line
    pub async fn query(&mut self, mnemonic: Mnemonic) -> Result<f32, Error> {
        self.dispatch(mnemonic, Parameter::Query).await?;
        let line = self.receive_line().await?;
        line.parse::<f32>()
            .map_err(|_| Error::Driver("reply is not a number"))
    }
    
    /**
        start measuring the current at the given mass
        
        the answer is received by polling with [Self::read_mass], only one scan can be in flight and its current must be taken before starting another.
    */
    pub async fn scan_mass(&mut self, mass: u16) -> Result<(), Error> {
        if ! self.scan.is_idle() 
            {return Err(Error::InvalidState)}
        // garbage received before the scan would be mistaken for its answer
        self.stream.flush()?;
        self.dispatch(command::MASS_READING, Parameter::Integer(i32::from(mass))).await?;
        if ! self.scan.arm() 
            {return Err(Error::InvalidState)}
        Ok(())
    }
    /// consume received scan bytes without waiting
    pub fn poll_scan(&mut self) -> ScanState {
        self.scan.poll(&mut self.stream)
    }
    /// current of the last scan if complete, it can be taken only once
    pub fn take_reading(&mut self) -> Option<u32> {
        self.scan.take()
    }
    /// non-blocking poll and take, meant to be called repeatedly in the caller's loop
    pub fn read_mass(&mut self) -> Option<u32> {
        self.poll_scan();
        self.take_reading()
    }
    pub fn scan_state(&self) -> ScanState {
        self.scan.state()
    }
    /// give up the scan in flight, dropping whatever it already received
    pub fn abandon_scan(&mut self) -> Result<(), Error> {
        self.scan.reset();
        self.stream.flush()
    }
    
    /// drop the reply remains of a setting command
    async fn discard_leftovers(&mut self) -> Result<(), Error> {
        if ! self.config.settle.is_zero() {
            tokio::time::sleep(self.config.settle).await;
        }
        self.stream.flush()
    }
}
