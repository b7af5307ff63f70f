use splitbits::{combinebits, splitbits, splitbits_named};

// The four outer-bank registers of the SMD132/SMD133.
//
// $xxx0: ABCC DEEE
//   A: CHR mask (CHR A17 from 0: MMC3; 1: alternate)
//   B: PRG mask (PRG A17 from 0: MMC3; 1: offset)
//   C: PRG offset (PRG A24, A23)
//   D: Alternate CHR A17
//   E: PRG offset (PRG A19, A18, A17)
// $xxx1: GHIJ KKL.
//   G: PRG mask (PRG A18 from 0: MMC3; 1: offset)
//   H: PRG mask (PRG A19 from 0: offset; 1: MMC3)
//   I: PRG mask (PRG A20 from 0: offset; 1: MMC3)
//   J: PRG offset (PRG A20)
//   K: PRG offset (PRG A22, A21)
//   L: GNROM mode bank size (1: 32 KiB, PRG A14 = CPU A14; 0: 16 KiB, PRG A14 = offset A14)
// $xxx2: .... MMMM
//   M: CHR offset for GNROM mode (CHR A16, A15, A14, A13)
// $xxx3: NP.T QQR.
//   N: Lockout (only effective in MMC3 mode)
//   P: "Weird MMC3 mode"
//   T: 1: GNROM mode; 0: MMC3 mode
//   Q, R: PRG offset for GNROM mode (PRG A16, A15, A14)
#[derive(PartialEq, Eq, Clone, Copy, Debug, Default)]
pub struct ControlRegisters([u8; 4]);

impl ControlRegisters {
    pub const fn new() -> Self {
        Self([0; 4])
    }

    pub const fn from_raw(raw: [u8; 4]) -> Self {
        Self(raw)
    }

    pub fn to_raw(self) -> [u8; 4] {
        self.0
    }

    pub fn get(self, index: usize) -> u8 {
        self.0[index]
    }

    pub fn clear(&mut self) {
        self.0 = [0; 4];
    }

    // Lockout only holds while GNROM mode is off.
    pub fn locked(self) -> bool {
        let fields = splitbits!(self.0[3], "n..t ....");
        fields.n && !fields.t
    }

    // Returns whether the write was accepted.
    pub fn write(&mut self, cpu_address: u16, value: u8) -> bool {
        if self.locked() {
            return false;
        }

        self.0[usize::from(cpu_address & 0b11)] = value;
        true
    }

    pub fn gnrom_mode(self) -> bool {
        splitbits!(self.0[3], "...t ....").t
    }

    pub fn weird_mode(self) -> bool {
        splitbits!(self.0[3], ".p.. ....").p
    }

    // 0xFF when CHR A17 comes from the MMC3, 0x7F when it comes from the alternate bit.
    pub fn chr_mask(self) -> u8 {
        let alternate = splitbits_named!(min=u8, self.0[0], "a... ....");
        0xFF ^ (alternate << 7)
    }

    // The alternate CHR A17, already in bank bit 7.
    pub fn alternate_chr_a17(self) -> u8 {
        let d = splitbits_named!(min=u8, self.0[0], ".... d...");
        d << 7
    }

    // CHR bank bits 6 through 3 for GNROM mode.
    pub fn gnrom_chr_offset(self) -> u8 {
        let m = splitbits_named!(min=u8, self.0[2], ".... mmmm");
        m << 3
    }

    // Which 8 KiB PRG bank bits come from the MMC3 rather than the outer offset:
    // (0x3F | I<<7 | H<<6) ^ B<<4 ^ G<<5
    pub fn prg_mask(self) -> u16 {
        let b = splitbits_named!(min=u8, self.0[0], ".b.. ....");
        let (g, h, i) = splitbits_named!(min=u8, self.0[1], "ghi. ....");
        let mmc3_mask = combinebits!(i, h, "ih11 1111");
        u16::from((mmc3_mask ^ (b << 4)) ^ (g << 5))
    }

    // PRG A24 through A17, as an 8-bit outer offset: C C K K J E E E
    pub fn prg_offset(self) -> u16 {
        let (c, e) = splitbits_named!(min=u8, self.0[0], "..cc .eee");
        let (j, k) = splitbits_named!(min=u8, self.0[1], "...j kk..");
        u16::from(combinebits!(c, k, j, e, "cckk jeee"))
    }

    pub fn gnrom_32kib_banks(self) -> bool {
        splitbits!(self.0[1], ".... ..l.").l
    }

    // The GNROM bank bits 3 through 1 that the outer registers supply. In 32 KiB mode bit 1 comes
    // from CPU A14 instead.
    pub fn gnrom_prg_offset(self, cpu_address: u16) -> u8 {
        if self.gnrom_32kib_banks() {
            let q = splitbits_named!(min=u8, self.0[3], ".... qq..");
            let a14 = splitbits_named!(min=u8, cpu_address, ".a.. .... .... ....");
            combinebits!(q, a14, "0000 qqa0")
        } else {
            let q = splitbits_named!(min=u8, self.0[3], ".... qqq.");
            q << 1
        }
    }
}
