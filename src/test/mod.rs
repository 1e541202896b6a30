mod channel;
mod queues;
mod scenario_spec;
mod scenarios;
mod sim_time;
