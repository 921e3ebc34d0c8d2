mod median;
mod nop;
