mod health_check;
mod helper;
mod submit;
