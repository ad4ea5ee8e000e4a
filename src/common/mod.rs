// Copyright (c) 2021-2024 Yuki Kishimoto
// Distributed under the MIT software license

pub mod http;
