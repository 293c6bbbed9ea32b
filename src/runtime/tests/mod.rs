mod kernels;
mod session;
