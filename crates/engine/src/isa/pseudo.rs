//! Assembler pseudo-instructions.
//!
//! Expansions use the operand names of the example: `RG1`..`RG3` for
//! registers, `VL1` for an immediate, `LAB` for a label, and `%hi`/`%lo` for
//! the halves of a 32-bit constant or address.

use super::instruction::ExtendedInstruction;

const fn pseudo(
    mnemonic: &'static str,
    example: &'static str,
    expansion: &'static [&'static str],
    description: &'static str,
) -> ExtendedInstruction {
    ExtendedInstruction {
        mnemonic,
        example,
        expansion,
        description,
    }
}

/// Pseudo-instruction table.
pub static INSTRUCTIONS: &[ExtendedInstruction] = &[
    pseudo("nop", "nop", &["addi x0, x0, 0"], "No operation"),
    pseudo("li", "li t1, -100", &["addi RG1, x0, VL2"],
        "Load a 12-bit immediate"),
    pseudo("li", "li t1, 100000", &["lui RG1, %hi(VL2)", "addi RG1, RG1, %lo(VL2)"],
        "Load a 32-bit immediate"),
    pseudo("la", "la t1, label", &["auipc RG1, %hi(LAB)", "addi RG1, RG1, %lo(LAB)"],
        "Load the address of a label"),
    pseudo("mv", "mv t1, t2", &["addi RG1, RG2, 0"], "Copy a register"),
    pseudo("not", "not t1, t2", &["xori RG1, RG2, -1"], "Bitwise complement"),
    pseudo("neg", "neg t1, t2", &["sub RG1, x0, RG2"], "Two's complement negation"),
    pseudo("sext.w", "sext.w t1, t2", &["addiw RG1, RG2, 0"],
        "Sign-extend the low word (RV64)"),
    pseudo("seqz", "seqz t1, t2", &["sltiu RG1, RG2, 1"], "Set if zero"),
    pseudo("snez", "snez t1, t2", &["sltu RG1, x0, RG2"], "Set if not zero"),
    pseudo("sltz", "sltz t1, t2", &["slt RG1, RG2, x0"], "Set if less than zero"),
    pseudo("sgtz", "sgtz t1, t2", &["slt RG1, x0, RG2"], "Set if greater than zero"),
    pseudo("sgt", "sgt t1, t2, t3", &["slt RG1, RG3, RG2"], "Set if greater than"),
    pseudo("sgtu", "sgtu t1, t2, t3", &["sltu RG1, RG3, RG2"],
        "Set if greater than (unsigned)"),
    pseudo("beqz", "beqz t1, label", &["beq RG1, x0, LAB"], "Branch if zero"),
    pseudo("bnez", "bnez t1, label", &["bne RG1, x0, LAB"], "Branch if not zero"),
    pseudo("blez", "blez t1, label", &["bge x0, RG1, LAB"], "Branch if less than or equal to zero"),
    pseudo("bgez", "bgez t1, label", &["bge RG1, x0, LAB"],
        "Branch if greater than or equal to zero"),
    pseudo("bltz", "bltz t1, label", &["blt RG1, x0, LAB"], "Branch if less than zero"),
    pseudo("bgtz", "bgtz t1, label", &["blt x0, RG1, LAB"], "Branch if greater than zero"),
    pseudo("bgt", "bgt t1, t2, label", &["blt RG2, RG1, LAB"], "Branch if greater than"),
    pseudo("ble", "ble t1, t2, label", &["bge RG2, RG1, LAB"], "Branch if less than or equal"),
    pseudo("bgtu", "bgtu t1, t2, label", &["bltu RG2, RG1, LAB"],
        "Branch if greater than (unsigned)"),
    pseudo("bleu", "bleu t1, t2, label", &["bgeu RG2, RG1, LAB"],
        "Branch if less than or equal (unsigned)"),
    pseudo("j", "j label", &["jal x0, LAB"], "Jump to label"),
    pseudo("jal", "jal label", &["jal ra, LAB"], "Jump to label and link in ra"),
    pseudo("jr", "jr t1", &["jalr x0, RG1, 0"], "Jump to the address in a register"),
    pseudo("jalr", "jalr t1", &["jalr ra, RG1, 0"], "Jump to a register and link in ra"),
    pseudo("ret", "ret", &["jalr x0, ra, 0"], "Return from a subroutine"),
    pseudo("call", "call label", &["auipc ra, %hi(LAB)", "jalr ra, ra, %lo(LAB)"],
        "Call a far-away subroutine"),
    pseudo("tail", "tail label", &["auipc x6, %hi(LAB)", "jalr x0, x6, %lo(LAB)"],
        "Tail-call a far-away subroutine"),
    pseudo("fmv.s", "fmv.s f1, f2", &["fsgnj.s RG1, RG2, RG2"], "Copy a single-precision register"),
    pseudo("fabs.s", "fabs.s f1, f2", &["fsgnjx.s RG1, RG2, RG2"], "Single-precision absolute value"),
    pseudo("fneg.s", "fneg.s f1, f2", &["fsgnjn.s RG1, RG2, RG2"], "Single-precision negation"),
    pseudo("fmv.d", "fmv.d f1, f2", &["fsgnj.d RG1, RG2, RG2"], "Copy a double-precision register"),
    pseudo("fabs.d", "fabs.d f1, f2", &["fsgnjx.d RG1, RG2, RG2"], "Double-precision absolute value"),
    pseudo("fneg.d", "fneg.d f1, f2", &["fsgnjn.d RG1, RG2, RG2"], "Double-precision negation"),
    pseudo("csrr", "csrr t1, fcsr", &["csrrs RG1, RG2, x0"], "Read a CSR"),
    pseudo("csrw", "csrw t1, fcsr", &["csrrw x0, RG2, RG1"], "Write a CSR"),
    pseudo("csrs", "csrs t1, fcsr", &["csrrs x0, RG2, RG1"], "Set bits in a CSR"),
    pseudo("csrc", "csrc t1, fcsr", &["csrrc x0, RG2, RG1"], "Clear bits in a CSR"),
    pseudo("csrwi", "csrwi fcsr, 1", &["csrrwi x0, RG1, VL2"], "Write a CSR immediate"),
    pseudo("frcsr", "frcsr t1", &["csrrs RG1, fcsr, x0"], "Read fcsr"),
    pseudo("fscsr", "fscsr t1", &["csrrw x0, fcsr, RG1"], "Write fcsr"),
    pseudo("frrm", "frrm t1", &["csrrs RG1, frm, x0"], "Read the rounding mode"),
    pseudo("fsrm", "fsrm t1", &["csrrw x0, frm, RG1"], "Write the rounding mode"),
    pseudo("frflags", "frflags t1", &["csrrs RG1, fflags, x0"], "Read the accrued flags"),
    pseudo("fsflags", "fsflags t1", &["csrrw x0, fflags, RG1"], "Write the accrued flags"),
    pseudo("rdcycle", "rdcycle t1", &["csrrs RG1, cycle, x0"], "Read the cycle counter"),
    pseudo("rdtime", "rdtime t1", &["csrrs RG1, time, x0"], "Read the timer"),
    pseudo("rdinstret", "rdinstret t1", &["csrrs RG1, instret, x0"],
        "Read the retired-instruction counter"),
];
