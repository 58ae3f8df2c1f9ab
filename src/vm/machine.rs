//! The fetch-execute loop.

use std::collections::VecDeque;
use std::rc::Rc;
use std::str::FromStr;

use til_compiler::emit::{Instruction, Module};

use super::image::{HALT_ADDRESS, Image, Target};
use super::runtime::Routine;
use super::{RuntimeError, VmConfig};

type Result<T> = std::result::Result<T, RuntimeError>;

/// A postfix stack machine running one loaded module.
///
/// Values live in memory: the stack pointer moves down by 4 bytes per
/// 32-bit value and 8 per double. A frame is addressed from the frame
/// pointer, with arguments above it and locals below.
#[derive(Debug)]
pub struct Machine {
    image: Image,
    config: VmConfig,
    pc: u32,
    sp: u32,
    fp: u32,
    fval32: i32,
    fval64: f64,
    input: VecDeque<String>,
    output: String,
    steps: u64,
}

impl Machine {
    /// Loads `module`.
    pub fn new(module: &Module, config: VmConfig) -> Result<Self> {
        let image = Image::load(module, &config)?;
        let top = image.memory.size();
        Ok(Self {
            image,
            config,
            pc: HALT_ADDRESS,
            sp: top,
            fp: top,
            fval32: 0,
            fval64: 0.0,
            input: VecDeque::new(),
            output: String::new(),
            steps: 0,
        })
    }

    /// Queues whitespace-separated tokens for `readi`/`readd`.
    pub fn feed(&mut self, input: &str) {
        self.input.extend(input.split_whitespace().map(str::to_string));
    }

    /// Everything printed so far.
    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn take_output(&mut self) -> String {
        std::mem::take(&mut self.output)
    }

    /// Instructions executed so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Calls the entry point and returns its result.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn run(&mut self) -> Result<i32> {
        let entry = self.image.resolve(&self.config.entry_label)?;
        self.sp = self.image.memory.size();
        self.fp = self.sp;
        self.push_i32(HALT_ADDRESS as i32)?;
        self.pc = entry;

        let code = Rc::clone(&self.image.code);
        loop {
            let index = match Target::of(self.pc) {
                Some(Target::Halt) => return Ok(self.fval32),
                Some(Target::Code(index)) if index < code.len() => index,
                _ => return Err(RuntimeError::BadBranch(self.pc)),
            };

            self.steps += 1;
            if let Some(limit) = self.config.step_limit
                && self.steps > limit
            {
                return Err(RuntimeError::StepLimitExceeded(limit));
            }

            self.execute(&code[index])?;
        }
    }

    fn execute(&mut self, instruction: &Instruction) -> Result<()> {
        let next = self.pc + 1;
        match instruction {
            // ====================================================================
            // Values
            // ====================================================================
            Instruction::Int(value) => self.push_i32(*value)?,
            Instruction::Double(value) => self.push_f64(value.into_inner())?,
            Instruction::Addr(label) => {
                let address = self.image.resolve(label)?;
                self.push_i32(address as i32)?;
            }
            Instruction::Local(offset) => {
                self.push_i32((self.fp as i32).wrapping_add(*offset))?;
            }
            Instruction::LdInt => {
                let address = self.pop_address()?;
                let value = self.image.memory.read_i32(address)?;
                self.push_i32(value)?;
            }
            Instruction::StInt => {
                let address = self.pop_address()?;
                let value = self.pop_i32()?;
                self.image.memory.write_i32(address, value)?;
            }
            Instruction::LdDouble => {
                let address = self.pop_address()?;
                let value = self.image.memory.read_f64(address)?;
                self.push_f64(value)?;
            }
            Instruction::StDouble => {
                let address = self.pop_address()?;
                let value = self.pop_f64()?;
                self.image.memory.write_f64(address, value)?;
            }
            Instruction::Dup32 => {
                let value = self.image.memory.read_i32(self.sp)?;
                self.push_i32(value)?;
            }
            Instruction::Dup64 => {
                let value = self.image.memory.read_f64(self.sp)?;
                self.push_f64(value)?;
            }
            Instruction::Trash(bytes) => self.release(*bytes)?,
            Instruction::Alloc => {
                let bytes = self.pop_i32()?.max(0) as u32;
                self.reserve(bytes)?;
            }
            Instruction::Sp => self.push_i32(self.sp as i32)?,

            // ====================================================================
            // Arithmetic
            // ====================================================================
            Instruction::Add => self.int_op(|a, b| Ok(a.wrapping_add(b)))?,
            Instruction::Sub => self.int_op(|a, b| Ok(a.wrapping_sub(b)))?,
            Instruction::Mul => self.int_op(|a, b| Ok(a.wrapping_mul(b)))?,
            Instruction::Div => self.int_op(|a, b| {
                a.checked_div(b).ok_or(RuntimeError::DivisionByZero)
            })?,
            Instruction::Mod => self.int_op(|a, b| {
                if b == 0 {
                    Err(RuntimeError::DivisionByZero)
                } else {
                    Ok(a.wrapping_rem(b))
                }
            })?,
            Instruction::Neg => {
                let value = self.pop_i32()?;
                self.push_i32(value.wrapping_neg())?;
            }
            Instruction::Lt => self.int_op(|a, b| Ok((a < b) as i32))?,
            Instruction::Le => self.int_op(|a, b| Ok((a <= b) as i32))?,
            Instruction::Gt => self.int_op(|a, b| Ok((a > b) as i32))?,
            Instruction::Ge => self.int_op(|a, b| Ok((a >= b) as i32))?,
            Instruction::Eq => self.int_op(|a, b| Ok((a == b) as i32))?,
            Instruction::Ne => self.int_op(|a, b| Ok((a != b) as i32))?,
            Instruction::And => self.int_op(|a, b| Ok((a != 0 && b != 0) as i32))?,
            Instruction::Or => self.int_op(|a, b| Ok((a != 0 || b != 0) as i32))?,
            Instruction::DAdd => self.double_op(|a, b| a + b)?,
            Instruction::DSub => self.double_op(|a, b| a - b)?,
            Instruction::DMul => self.double_op(|a, b| a * b)?,
            Instruction::DDiv => self.double_op(|a, b| a / b)?,
            Instruction::DNeg => {
                let value = self.pop_f64()?;
                self.push_f64(-value)?;
            }
            Instruction::DCmp => {
                let right = self.pop_f64()?;
                let left = self.pop_f64()?;
                // unordered compares as greater
                let order = left.partial_cmp(&right).map_or(1, |order| order as i32);
                self.push_i32(order)?;
            }
            Instruction::I2D => {
                let value = self.pop_i32()?;
                self.push_f64(f64::from(value))?;
            }

            // ====================================================================
            // Control
            // ====================================================================
            Instruction::Label(_) => {}
            Instruction::Jmp(label) => {
                self.pc = self.image.resolve(label)?;
                return Ok(());
            }
            Instruction::Jz(label) | Instruction::Jnz(label) => {
                let value = self.pop_i32()?;
                let jump = matches!(instruction, Instruction::Jz(_)) == (value == 0);
                if jump {
                    self.pc = self.image.resolve(label)?;
                    return Ok(());
                }
            }
            Instruction::Enter(size) => {
                self.push_i32(self.fp as i32)?;
                self.fp = self.sp;
                self.reserve(*size)?;
            }
            Instruction::Leave => {
                self.sp = self.fp;
                self.fp = self.pop_address()?;
            }
            Instruction::Ret => {
                self.pc = self.pop_address()?;
                return Ok(());
            }
            Instruction::Call(label) => {
                let target = self.image.resolve(label)?;
                return self.call(target, next);
            }
            Instruction::Branch => {
                let target = self.pop_address()?;
                return self.call(target, next);
            }
            Instruction::LdFval32 => self.push_i32(self.fval32)?,
            Instruction::LdFval64 => self.push_f64(self.fval64)?,
            Instruction::StFval32 => self.fval32 = self.pop_i32()?,
            Instruction::StFval64 => self.fval64 = self.pop_f64()?,
        }
        self.pc = next;
        Ok(())
    }

    /// Transfers control to `target`. Runtime routines run on the spot
    /// and never see a return address.
    fn call(&mut self, target: u32, return_to: u32) -> Result<()> {
        match Target::of(target) {
            Some(Target::Routine(routine)) => {
                self.invoke(routine)?;
                self.pc = return_to;
            }
            Some(Target::Code(_)) => {
                self.push_i32(return_to as i32)?;
                self.pc = target;
            }
            _ => return Err(RuntimeError::BadBranch(target)),
        }
        Ok(())
    }

    /// Runs a routine whose first argument is at the top of the stack.
    fn invoke(&mut self, routine: Routine) -> Result<()> {
        let memory = &self.image.memory;
        match routine {
            Routine::PrintInt => {
                let value = memory.read_i32(self.sp)?;
                self.output.push_str(&value.to_string());
            }
            Routine::PrintDouble => {
                let value = memory.read_f64(self.sp)?;
                self.output.push_str(&value.to_string());
            }
            Routine::PrintString => {
                let address = memory.read_i32(self.sp)? as u32;
                let text = memory.read_c_string(address)?;
                self.output.push_str(&text);
            }
            Routine::PrintNewline => self.output.push('\n'),
            Routine::ReadInt => self.fval32 = self.read_input("int")?,
            Routine::ReadDouble => self.fval64 = self.read_input("double")?,
        }
        Ok(())
    }

    fn read_input<T: FromStr>(&mut self, expected: &'static str) -> Result<T> {
        let Some(token) = self.input.pop_front() else {
            return Err(RuntimeError::InputExhausted);
        };
        match token.parse() {
            Ok(value) => Ok(value),
            Err(_) => Err(RuntimeError::InvalidInput {
                input: token,
                expected,
            }),
        }
    }

    // ========================================================================
    // Stack
    // ========================================================================

    fn reserve(&mut self, bytes: u32) -> Result<()> {
        self.sp = self
            .sp
            .checked_sub(bytes)
            .filter(|&sp| sp >= self.image.data_end)
            .ok_or(RuntimeError::StackOverflow)?;
        Ok(())
    }

    fn release(&mut self, bytes: u32) -> Result<()> {
        let sp = self.sp.saturating_add(bytes);
        if sp > self.image.memory.size() {
            return Err(RuntimeError::BadAddress {
                address: self.sp,
                width: bytes,
            });
        }
        self.sp = sp;
        Ok(())
    }

    fn push_i32(&mut self, value: i32) -> Result<()> {
        self.reserve(4)?;
        self.image.memory.write_i32(self.sp, value)
    }

    fn pop_i32(&mut self) -> Result<i32> {
        let value = self.image.memory.read_i32(self.sp)?;
        self.release(4)?;
        Ok(value)
    }

    fn pop_address(&mut self) -> Result<u32> {
        Ok(self.pop_i32()? as u32)
    }

    fn push_f64(&mut self, value: f64) -> Result<()> {
        self.reserve(8)?;
        self.image.memory.write_f64(self.sp, value)
    }

    fn pop_f64(&mut self) -> Result<f64> {
        let value = self.image.memory.read_f64(self.sp)?;
        self.release(8)?;
        Ok(value)
    }

    fn int_op(&mut self, op: impl FnOnce(i32, i32) -> Result<i32>) -> Result<()> {
        let right = self.pop_i32()?;
        let left = self.pop_i32()?;
        self.push_i32(op(left, right)?)
    }

    fn double_op(&mut self, op: impl FnOnce(f64, f64) -> f64) -> Result<()> {
        let right = self.pop_f64()?;
        let left = self.pop_f64()?;
        self.push_f64(op(left, right))
    }
}
