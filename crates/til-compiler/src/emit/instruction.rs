//! Postfix machine instructions and static data items.

use std::fmt;

use ordered_float::OrderedFloat;

/// One stack-machine instruction.
///
/// Unless noted, operands are popped from the value stack and results
/// pushed back. 32-bit values are ints, string handles, pointers and
/// function addresses; 64-bit values are doubles.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Instruction {
    // ========================================================================
    // Values
    // ========================================================================
    /// Push an int immediate.
    Int(i32),
    /// Push a double immediate.
    Double(OrderedFloat<f64>),
    /// Push the address of a label.
    Addr(String),
    /// Push the frame pointer plus an offset.
    Local(i32),
    LdInt,
    StInt,
    LdDouble,
    StDouble,
    Dup32,
    Dup64,
    /// Drop this many bytes from the stack.
    Trash(u32),
    /// Pop a byte count and reserve that much stack.
    Alloc,
    /// Push the stack pointer.
    Sp,

    // ========================================================================
    // Arithmetic
    // ========================================================================
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Neg,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    And,
    Or,
    DAdd,
    DSub,
    DMul,
    DDiv,
    DNeg,
    /// Compare two doubles, pushing -1, 0 or 1.
    DCmp,
    /// Widen an int to a double.
    I2D,

    // ========================================================================
    // Control
    // ========================================================================
    Label(String),
    Jmp(String),
    /// Jump if the popped int is zero.
    Jz(String),
    /// Jump if the popped int is not zero.
    Jnz(String),
    /// Save the frame pointer and reserve a frame of this many bytes.
    Enter(u32),
    Leave,
    Ret,
    /// Call a label directly.
    Call(String),
    /// Call the popped address.
    Branch,
    /// Push the 32-bit return register.
    LdFval32,
    /// Push the 64-bit return register.
    LdFval64,
    /// Pop into the 32-bit return register.
    StFval32,
    /// Pop into the 64-bit return register.
    StFval64,
}

impl Instruction {
    /// The label this instruction jumps to, if any.
    pub fn jump_target(&self) -> Option<&str> {
        match self {
            Instruction::Jmp(label) | Instruction::Jz(label) | Instruction::Jnz(label) => {
                Some(label)
            }
            _ => None,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Int(value) => write!(f, "INT {value}"),
            Instruction::Double(value) => write!(f, "DOUBLE {value}"),
            Instruction::Addr(label) => write!(f, "ADDR {label}"),
            Instruction::Local(offset) => write!(f, "LOCAL {offset}"),
            Instruction::LdInt => f.write_str("LDINT"),
            Instruction::StInt => f.write_str("STINT"),
            Instruction::LdDouble => f.write_str("LDDOUBLE"),
            Instruction::StDouble => f.write_str("STDOUBLE"),
            Instruction::Dup32 => f.write_str("DUP32"),
            Instruction::Dup64 => f.write_str("DUP64"),
            Instruction::Trash(bytes) => write!(f, "TRASH {bytes}"),
            Instruction::Alloc => f.write_str("ALLOC"),
            Instruction::Sp => f.write_str("SP"),
            Instruction::Add => f.write_str("ADD"),
            Instruction::Sub => f.write_str("SUB"),
            Instruction::Mul => f.write_str("MUL"),
            Instruction::Div => f.write_str("DIV"),
            Instruction::Mod => f.write_str("MOD"),
            Instruction::Neg => f.write_str("NEG"),
            Instruction::Lt => f.write_str("LT"),
            Instruction::Le => f.write_str("LE"),
            Instruction::Gt => f.write_str("GT"),
            Instruction::Ge => f.write_str("GE"),
            Instruction::Eq => f.write_str("EQ"),
            Instruction::Ne => f.write_str("NE"),
            Instruction::And => f.write_str("AND"),
            Instruction::Or => f.write_str("OR"),
            Instruction::DAdd => f.write_str("DADD"),
            Instruction::DSub => f.write_str("DSUB"),
            Instruction::DMul => f.write_str("DMUL"),
            Instruction::DDiv => f.write_str("DDIV"),
            Instruction::DNeg => f.write_str("DNEG"),
            Instruction::DCmp => f.write_str("DCMP"),
            Instruction::I2D => f.write_str("I2D"),
            Instruction::Label(label) => write!(f, "LABEL {label}"),
            Instruction::Jmp(label) => write!(f, "JMP {label}"),
            Instruction::Jz(label) => write!(f, "JZ {label}"),
            Instruction::Jnz(label) => write!(f, "JNZ {label}"),
            Instruction::Enter(size) => write!(f, "ENTER {size}"),
            Instruction::Leave => f.write_str("LEAVE"),
            Instruction::Ret => f.write_str("RET"),
            Instruction::Call(label) => write!(f, "CALL {label}"),
            Instruction::Branch => f.write_str("BRANCH"),
            Instruction::LdFval32 => f.write_str("LDFVAL32"),
            Instruction::LdFval64 => f.write_str("LDFVAL64"),
            Instruction::StFval32 => f.write_str("STFVAL32"),
            Instruction::StFval64 => f.write_str("STFVAL64"),
        }
    }
}

/// One item of a data segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DataItem {
    /// Names the address of the next item.
    Label(String),
    /// Exports a label from the module.
    Global(String),
    SInt(i32),
    SDouble(OrderedFloat<f64>),
    /// NUL-terminated bytes.
    SString(String),
    /// The address of a label.
    SAddr(String),
    /// This many zeroed bytes.
    SAlloc(u32),
}

impl DataItem {
    /// Bytes the item occupies, before alignment.
    pub fn size(&self) -> u32 {
        match self {
            DataItem::Label(_) | DataItem::Global(_) => 0,
            DataItem::SInt(_) | DataItem::SAddr(_) => 4,
            DataItem::SDouble(_) => 8,
            DataItem::SString(text) => text.len() as u32 + 1,
            DataItem::SAlloc(bytes) => *bytes,
        }
    }
}

impl fmt::Display for DataItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataItem::Label(label) => write!(f, "LABEL {label}"),
            DataItem::Global(label) => write!(f, "GLOBAL {label}, OBJ"),
            DataItem::SInt(value) => write!(f, "SINT {value}"),
            DataItem::SDouble(value) => write!(f, "SDOUBLE {value}"),
            DataItem::SString(text) => write!(f, "SSTRING {text:?}"),
            DataItem::SAddr(label) => write!(f, "SADDR {label}"),
            DataItem::SAlloc(bytes) => write!(f, "SALLOC {bytes}"),
        }
    }
}
