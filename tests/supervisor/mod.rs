mod clean;
mod kill;
mod run;
mod status;
