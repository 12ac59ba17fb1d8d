/*!
    status byte echoed by the instrument after setting commands
    
    the byte is a bitfield of error flags, least significant bit first. Bits 2 and 7 are unused by the instrument, and bit 3 only has a meaning when the optional electron multiplier (CDEM) is installed.
*/

use core::fmt;
use bilge::prelude::*;
use packbytes::FromBytes;
use crate::pack_bilge;


/// raw status byte
#[bitsize(8)]
#[derive(Copy, Clone, FromBits, DebugBits, PartialEq, Default)]
pub struct StatusWord {
    /// RS232 communication error
    pub communication: bool,
    /// filament cannot reach its emission current
    pub filament: bool,
    reserved_2: bool,
    /// electron multiplier (CDEM) high voltage error
    pub multiplier: bool,
    /// quadrupole mass filter RF power supply error
    pub mass_filter: bool,
    /// electrometer error
    pub detector: bool,
    /// 24V external power supply error
    pub power_supply: bool,
    reserved_7: bool,
}
pack_bilge!(StatusWord);

/// named fault condition reported in a status byte
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Fault {
    Communication,
    Filament,
    ElectronMultiplier,
    MassFilter,
    Detector,
    PowerSupply,
}
impl Fault {
    /// all faults, most significant bit first
    pub const ALL: [Fault; 6] = [
        Fault::PowerSupply,
        Fault::Detector,
        Fault::MassFilter,
        Fault::ElectronMultiplier,
        Fault::Filament,
        Fault::Communication,
        ];
    
    /// position of this fault's flag in the status byte
    pub const fn bit(self) -> u8 {
        match self {
            Fault::Communication => 0,
            Fault::Filament => 1,
            Fault::ElectronMultiplier => 3,
            Fault::MassFilter => 4,
            Fault::Detector => 5,
            Fault::PowerSupply => 6,
        }
    }
    fn is_set(self, word: StatusWord) -> bool {
        match self {
            Fault::Communication => word.communication(),
            Fault::Filament => word.filament(),
            Fault::ElectronMultiplier => word.multiplier(),
            Fault::MassFilter => word.mass_filter(),
            Fault::Detector => word.detector(),
            Fault::PowerSupply => word.power_supply(),
        }
    }
}
impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Fault::Communication => "communication",
            Fault::Filament => "filament",
            Fault::ElectronMultiplier => "electron multiplier",
            Fault::MassFilter => "mass filter",
            Fault::Detector => "detector",
            Fault::PowerSupply => "power supply",
        })
    }
}

/// set of faults decoded from a status byte
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct Faults {
    /// one bit per fault, at the position it has in the status byte
    bits: u8,
}
impl Faults {
    pub const fn empty() -> Self {Self {bits: 0}}
    pub const fn is_empty(&self) -> bool {self.bits == 0}
    pub const fn contains(&self, fault: Fault) -> bool {
        self.bits & (1 << fault.bit()) != 0
    }
    pub fn insert(&mut self, fault: Fault) {
        self.bits |= 1 << fault.bit();
    }
    pub fn len(&self) -> usize {
        self.bits.count_ones() as usize
    }
    /// faults in the set, most significant bit first
    pub fn iter(&self) -> impl Iterator<Item=Fault> + '_ {
        Fault::ALL.into_iter().filter(|fault| self.contains(*fault))
    }
}
impl FromIterator<Fault> for Faults {
    fn from_iter<I: IntoIterator<Item=Fault>>(iter: I) -> Self {
        let mut faults = Self::empty();
        for fault in iter {
            faults.insert(fault);
        }
        faults
    }
}
impl fmt::Debug for Faults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
impl fmt::Display for Faults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() 
            {return f.write_str("none")}
        for (i, fault) in self.iter().enumerate() {
            if i != 0 {f.write_str(", ")?;}
            write!(f, "{}", fault)?;
        }
        Ok(())
    }
}

/**
    decode a status byte into the faults it reports
    
    without the electron multiplier option, its flag carries no meaning and is ignored. Decoding never fails, unused bits are simply dropped.
*/
pub fn decode(byte: u8, cdem_present: bool) -> Faults {
    let mut word = StatusWord::from_le_bytes([byte]);
    if ! cdem_present {
        word.set_multiplier(false);
    }
    Fault::ALL.into_iter()
        .filter(|fault| fault.is_set(word))
        .collect()
}
